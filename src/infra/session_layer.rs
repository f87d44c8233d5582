use tower_sessions::{
    Expiry, SessionManagerLayer,
    cookie::{SameSite, time::Duration},
};
use tower_sessions_sqlx_store::PostgresStore;

use super::ServerSettings;

pub const SESSION_COOKIE_NAME: &str = "shop_session";

/// Sessions idle for two weeks expire.
const SESSION_IDLE_DAYS: i64 = 14;

pub fn create_session_layer(
    store: PostgresStore,
    settings: &ServerSettings,
) -> SessionManagerLayer<PostgresStore> {
    SessionManagerLayer::new(store)
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(Duration::days(SESSION_IDLE_DAYS)))
        .with_secure(settings.secure_cookies)
        .with_same_site(SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
