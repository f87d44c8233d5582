use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use tracing::error;

use crate::domain::{
    accounts::{AccountError, LOGIN_PATH},
    cart::CartError,
    catalog::CatalogError,
    orders::OrderError,
};

#[derive(Debug)]
pub enum ClientError {
    Account(AccountError),
    Cart(CartError),
    Catalog(CatalogError),
    Order(OrderError),
    Payload(String),
    Unauthenticated,
    Forbidden,
    Internal(anyhow::Error),
}

impl IntoResponse for ClientError {
    fn into_response(self) -> Response {
        #[derive(serde::Serialize)]
        struct ErrorResponse {
            message: String,
        }

        let (status, message) = match self {
            ClientError::Account(account_error) => {
                let status = match account_error {
                    AccountError::InvalidCredentials => StatusCode::UNAUTHORIZED,
                    AccountError::UserDoesNotExist(_) => StatusCode::NOT_FOUND,
                    AccountError::UsernameTaken(_) | AccountError::Validation(_) => {
                        StatusCode::BAD_REQUEST
                    }
                };
                (status, account_error.to_string())
            }
            ClientError::Cart(cart_error) => {
                let status = match cart_error {
                    CartError::ProductDoesNotExist(_) | CartError::LineDoesNotExist(_) => {
                        StatusCode::NOT_FOUND
                    }
                    CartError::CannotCheckoutEmptyCart => StatusCode::BAD_REQUEST,
                };
                (status, cart_error.to_string())
            }
            ClientError::Catalog(catalog_error) => {
                let status = match catalog_error {
                    CatalogError::ProductDoesNotExist(_) => StatusCode::NOT_FOUND,
                    CatalogError::InvalidProduct(_) => StatusCode::BAD_REQUEST,
                };
                (status, catalog_error.to_string())
            }
            ClientError::Order(order_error) => {
                let status = match order_error {
                    OrderError::OrderDoesNotExist(_) => StatusCode::NOT_FOUND,
                    OrderError::AlreadyReviewed { .. } => StatusCode::CONFLICT,
                    OrderError::InvalidPaymentMethod => StatusCode::BAD_REQUEST,
                };
                (status, order_error.to_string())
            }
            ClientError::Payload(message) => (StatusCode::BAD_REQUEST, message),
            ClientError::Unauthenticated => return Redirect::to(LOGIN_PATH).into_response(),
            ClientError::Forbidden => (
                StatusCode::FORBIDDEN,
                "You do not have permission to perform this action.".to_owned(),
            ),
            ClientError::Internal(e) => {
                error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Please ask your system administrator to check the logs.".to_owned(),
                )
            }
        };

        (status, Json(ErrorResponse { message })).into_response()
    }
}

impl From<AccountError> for ClientError {
    fn from(account_error: AccountError) -> Self {
        ClientError::Account(account_error)
    }
}

impl From<CartError> for ClientError {
    fn from(cart_error: CartError) -> Self {
        ClientError::Cart(cart_error)
    }
}

impl From<CatalogError> for ClientError {
    fn from(catalog_error: CatalogError) -> Self {
        ClientError::Catalog(catalog_error)
    }
}

impl From<OrderError> for ClientError {
    fn from(order_error: OrderError) -> Self {
        ClientError::Order(order_error)
    }
}

impl From<anyhow::Error> for ClientError {
    fn from(value: anyhow::Error) -> Self {
        ClientError::Internal(value)
    }
}

impl From<tower_sessions::session::Error> for ClientError {
    fn from(value: tower_sessions::session::Error) -> Self {
        ClientError::Internal(anyhow::Error::new(value).context("Session store problem."))
    }
}
