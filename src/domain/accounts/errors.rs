use crate::domain::UserId;

#[derive(Debug, PartialEq, thiserror::Error)]
pub enum AccountError {
    #[error("Invalid credentials.")]
    InvalidCredentials,
    #[error("Username {0} is already taken.")]
    UsernameTaken(String),
    #[error("User with ID {0} does not exist.")]
    UserDoesNotExist(UserId),
    #[error("{0}")]
    Validation(String),
}
