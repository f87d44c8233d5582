use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use serial_test::serial;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::test_utils::{add_to_cart, create_product, new_client, register, start_test_server};

async fn post_cart(client: &httpc_test::Client, path: &str) -> (StatusCode, Value) {
    let res = client
        .do_post(path, json!({}))
        .await
        .expect("Cart request should succeed.");
    let status = res.status();
    (status, res.json_body().expect("Body should be JSON."))
}

#[sqlx::test]
#[serial]
async fn cart_lines_follow_add_increase_decrease_and_remove(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let mug = create_product(&app_state.pool, "Mug", Decimal::new(1250, 2)).await;

    let client = new_client(&app_state);
    register(&client, "alice", "client").await;

    let cart = add_to_cart(&client, mug, 1).await;
    assert_eq!(cart["lines"][0]["quantity"], 1);

    let (status, cart) = post_cart(&client, &format!("/shop/cart/increase/{mug}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(cart["lines"][0]["quantity"], 2);
    assert_eq!(cart["totals"]["subtotal"], "25.00");

    let (_, cart) = post_cart(&client, &format!("/shop/cart/decrease/{mug}")).await;
    assert_eq!(cart["lines"][0]["quantity"], 1);

    // Decreasing the last unit removes the line.
    let (_, cart) = post_cart(&client, &format!("/shop/cart/decrease/{mug}")).await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));

    add_to_cart(&client, mug, 1).await;
    let (_, cart) = post_cart(&client, &format!("/shop/cart/remove/{mug}")).await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));

    let (status, _) = post_cart(&client, &format!("/shop/cart/remove/{mug}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}
