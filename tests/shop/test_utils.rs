use std::time::Duration;

use httpc_test::Client;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use shop_server::{
    AppState, construct_app_state,
    domain::{
        ProductId,
        catalog::products::{Product, insert_product},
    },
    infra::get_config_settings,
    start_server,
};
use sqlx::{PgPool, postgres::PgConnectOptions};
use tokio::task::JoinHandle;

pub const PASSWORD: &str = "correct-horse-battery";

pub async fn start_test_server(
    connect_options: PgConnectOptions,
) -> (JoinHandle<Result<(), anyhow::Error>>, AppState) {
    let mut settings = get_config_settings().expect("Could not read application configuration.");
    settings.database.database_name = connect_options
        .get_database()
        .expect("Expected database name.")
        .into();
    let app_state = construct_app_state(settings)
        .await
        .expect("Expected AppState to be created.");
    let server_handle = tokio::task::spawn(start_server(app_state.clone()));

    wait_for_server(&app_state).await;
    (server_handle, app_state)
}

/// Polls the health check every 100ms for up to 10 seconds.
async fn wait_for_server(app_state: &AppState) {
    let client = new_client(app_state);
    for _ in 0..100 {
        if let Ok(res) = client.do_get("/healthcheck").await {
            if res.status().is_success() {
                return;
            }
        }
        tokio::time::sleep(Duration::from_millis(100)).await;
    }
    panic!("Web server did not start in time.");
}

/// A client with its own cookie jar, so each one is a separate browser session.
pub fn new_client(app_state: &AppState) -> Client {
    let url = format!("http://{}", app_state.settings.application.address());
    httpc_test::new_client(url).expect("Expected client to be created.")
}

/// Registers a user and returns the body of the dashboard it was redirected to.
pub async fn register(client: &Client, username: &str, role: &str) -> Value {
    let res = client
        .do_post(
            "/accounts/register",
            json!({
                "username": username,
                "email": format!("{username}@example.com"),
                "password1": PASSWORD,
                "password2": PASSWORD,
                "role": role,
            }),
        )
        .await
        .expect("Registration request should succeed.");
    assert!(res.status().is_success(), "Registration of {username} failed.");
    res.json_body().expect("Dashboard should be JSON.")
}

pub async fn create_product(pool: &PgPool, name: &str, price: Decimal) -> ProductId {
    let product = Product {
        product_id: ProductId::new(),
        name: name.to_owned(),
        price,
        description: String::new(),
        category: "Kitchen".to_owned(),
        image: None,
    };
    let mut tx = pool.begin().await.expect("Transaction should start.");
    insert_product(&mut tx, &product)
        .await
        .expect("Product should be inserted.");
    tx.commit().await.expect("Product should be committed.");
    product.product_id
}

/// Adds the product to the cart `times` times and returns the cart view.
pub async fn add_to_cart(client: &Client, product_id: ProductId, times: usize) -> Value {
    let mut cart = Value::Null;
    for _ in 0..times {
        let res = client
            .do_post(&format!("/shop/cart/add/{product_id}"), json!({}))
            .await
            .expect("Add to cart should succeed.");
        assert!(res.status().is_success());
        cart = res.json_body().expect("Cart should be JSON.");
    }
    cart
}

pub async fn checkout(client: &Client, idempotency_key: Option<uuid::Uuid>) -> Value {
    let res = client
        .do_post(
            "/shop/checkout",
            json!({ "payment_method": "card", "idempotency_key": idempotency_key }),
        )
        .await
        .expect("Checkout request should succeed.");
    assert!(res.status().is_success(), "Checkout failed with {}", res.status());
    res.json_body().expect("Confirmation should be JSON.")
}
