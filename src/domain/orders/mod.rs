mod admin_orders;
mod checkout;
mod client_orders;
mod errors;
mod invoice;
pub mod invoice_renderer;
pub mod order_history;
mod review_order;
mod status;

pub use admin_orders::admin_orders;
pub use checkout::{
    CheckoutPayload, OrderConfirmation, PlaceOrderCommand, checkout_endpoint, checkout_page,
};
pub use client_orders::client_orders;
pub use errors::OrderError;
pub use invoice::invoice_endpoint;
pub use invoice_renderer::{InvoiceRenderer, PdfInvoiceRenderer};
pub use order_history::order_counts;
pub use review_order::{accept_order_endpoint, reject_order_endpoint};
pub use status::OrderStatus;

pub const ADMIN_ORDERS_PATH: &str = "/accounts/admin/orders";
