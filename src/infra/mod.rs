mod cli;
mod client_error;
mod config;
mod session_layer;

pub use cli::Cli;
pub use client_error::ClientError;
pub use config::{DatabaseSettings, ServerSettings, Settings, get_config_settings};
pub use session_layer::{SESSION_COOKIE_NAME, create_session_layer};
