mod add_item;
mod apply_coupon;
pub(crate) mod cart_lines;
mod cart_view;
pub mod coupons;
mod decrease_item;
mod errors;
mod increase_item;
pub mod pricing;
mod remove_item;

pub use add_item::{AddItemCommand, add_item_endpoint};
pub use apply_coupon::{ApplyCouponPayload, apply_coupon_endpoint};
pub use cart_lines::{CART_PATH, CartLine, LineChange, LineState};
pub use cart_view::{CartLineView, CartView, cart_view};
pub use decrease_item::{DecreaseItemCommand, decrease_item_endpoint};
pub use errors::CartError;
pub use increase_item::{IncreaseItemCommand, increase_item_endpoint};
pub use remove_item::{RemoveItemCommand, remove_item_endpoint};
