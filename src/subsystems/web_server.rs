use std::net::SocketAddr;

use async_trait::async_trait;
use axum::{
    Json, Router,
    response::Redirect,
    routing::{get, post},
};
use futures::FutureExt;
use tokio::select;
use tokio_graceful_shutdown::{IntoSubsystem, SubsystemHandle};
use tower_http::{services::ServeDir, trace::TraceLayer};
use tracing::{error, info};

use crate::{
    AppState,
    domain::{accounts, cart, catalog, orders},
    infra::{ClientError, create_session_layer},
};

pub struct WebServer {
    state: AppState,
}

impl WebServer {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }
}

#[async_trait]
impl IntoSubsystem<anyhow::Error> for WebServer {
    async fn run(self, subsys: SubsystemHandle) -> Result<(), anyhow::Error> {
        let address = self.state.settings.application.address();
        let socket_addr: SocketAddr = address.parse()
            .inspect_err(|e| error!("Could not parse server address {address}.\nCheck application host and port in configuration settings.\nFailed with {e}"))?;

        let router = build_router(self.state);

        let listener = tokio::net::TcpListener::bind(socket_addr)
            .await
            .inspect_err(|e| {
                error!("Could not bind socket address {socket_addr}. Failed with {e}")
            })?;

        info!("Web server starting on http://{socket_addr}");
        select!(
            result = axum::serve(listener, router.into_make_service()).into_future().map(|result| result.map_err(anyhow::Error::new)) => {
                error!("Web server completed with {result:?}");
            }
            _ = subsys.on_shutdown_requested() => {
                info!("Web server shutdown");
            }
        );
        Ok(())
    }
}

pub fn build_router(state: AppState) -> Router {
    let session_layer = create_session_layer(state.sessions.clone(), &state.settings.application);
    let media = ServeDir::new(state.settings.application.media_directory.as_std_path());

    Router::new()
        .route("/", get(|| async { Redirect::to("/shop/") }))
        .route("/healthcheck", get(health_check_endpoint))
        // Accounts
        .route(
            "/accounts/login",
            get(accounts::login_page).post(accounts::login_endpoint),
        )
        .route(
            "/accounts/register",
            get(accounts::register_page).post(accounts::register_endpoint),
        )
        .route(
            "/accounts/logout",
            get(accounts::logout_endpoint).post(accounts::logout_endpoint),
        )
        .route(
            "/accounts/edit-profile",
            get(accounts::edit_profile_page).post(accounts::edit_profile_endpoint),
        )
        .route("/accounts/client/dashboard", get(accounts::client_dashboard))
        .route("/accounts/client/orders", get(orders::client_orders))
        .route("/accounts/order/{order_id}/pdf", get(orders::invoice_endpoint))
        // Staff
        .route("/accounts/admin/dashboard", get(accounts::admin_dashboard))
        .route("/accounts/admin/users", get(accounts::users_list))
        .route("/accounts/admin/orders", get(orders::admin_orders))
        .route(
            "/accounts/admin/orders/{order_id}/accept",
            post(orders::accept_order_endpoint),
        )
        .route(
            "/accounts/admin/orders/{order_id}/reject",
            post(orders::reject_order_endpoint),
        )
        .route("/accounts/admin/products", get(catalog::admin_products))
        .route(
            "/accounts/admin/product/add",
            post(catalog::add_product_endpoint),
        )
        .route(
            "/accounts/admin/product/edit/{product_id}",
            post(catalog::edit_product_endpoint),
        )
        .route(
            "/accounts/admin/product/delete/{product_id}",
            post(catalog::delete_product_endpoint),
        )
        // Shop
        .route("/shop", get(|| async { Redirect::to("/shop/") }))
        .route("/shop/", get(catalog::product_list))
        .route("/shop/product/{product_id}", get(catalog::product_detail))
        .route("/shop/cart", get(cart::cart_view))
        .route("/shop/cart/add/{product_id}", post(cart::add_item_endpoint))
        .route(
            "/shop/cart/remove/{product_id}",
            post(cart::remove_item_endpoint),
        )
        .route(
            "/shop/cart/increase/{product_id}",
            post(cart::increase_item_endpoint),
        )
        .route(
            "/shop/cart/decrease/{product_id}",
            post(cart::decrease_item_endpoint),
        )
        .route("/shop/cart/apply-coupon", post(cart::apply_coupon_endpoint))
        .route(
            "/shop/checkout",
            get(orders::checkout_page).post(orders::checkout_endpoint),
        )
        .nest_service("/media", media)
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn health_check_endpoint() -> Result<Json<String>, ClientError> {
    Ok(Json("Ok".to_owned()))
}
