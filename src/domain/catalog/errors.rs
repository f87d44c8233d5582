use crate::domain::ProductId;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum CatalogError {
    #[error("Product with ID {0} does not exist.")]
    ProductDoesNotExist(ProductId),
    #[error("{0}")]
    InvalidProduct(String),
}
