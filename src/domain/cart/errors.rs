use crate::domain::ProductId;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CartError {
    #[error("Product with ID {0} does not exist.")]
    ProductDoesNotExist(ProductId),
    #[error("Product with ID {0} is not in your cart.")]
    LineDoesNotExist(ProductId),
    #[error("Your cart is empty.")]
    CannotCheckoutEmptyCart,
}
