use crate::domain::OrderId;

use super::OrderStatus;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum OrderError {
    #[error("Order with ID {0} does not exist.")]
    OrderDoesNotExist(OrderId),
    #[error("Order {order_id} has already been {status}.")]
    AlreadyReviewed {
        order_id: OrderId,
        status: OrderStatus,
    },
    #[error("Payment method must be at most 50 characters.")]
    InvalidPaymentMethod,
}
