use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;
use shop_server::domain::cart::coupons::upsert_coupon;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use crate::test_utils::{
    add_to_cart, checkout, create_product, new_client, register, start_test_server,
};

#[sqlx::test]
#[serial]
async fn a_client_checks_out_a_discounted_cart(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let pool = app_state.pool.clone();

    let mug = create_product(&pool, "Mug", Decimal::new(2000, 2)).await;
    let tea = create_product(&pool, "Tea", Decimal::new(500, 2)).await;
    upsert_coupon(&pool, "SAVE10", Decimal::TEN)
        .await
        .expect("Coupon should be created.");

    let client = new_client(&app_state);
    let dashboard = register(&client, "alice", "client").await;
    assert_eq!(dashboard["username"], "alice");

    add_to_cart(&client, mug, 2).await;
    let cart = add_to_cart(&client, tea, 1).await;
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(2));
    assert_eq!(cart["totals"]["subtotal"], "45.00");

    // Codes match in any case.
    let res = client
        .do_post("/shop/cart/apply-coupon", json!({ "coupon_code": " save10 " }))
        .await
        .expect("Applying a coupon should succeed.");
    let cart = res.json_body().expect("Cart should be JSON.");
    assert_eq!(cart["coupon_code"], "SAVE10");
    assert_eq!(cart["totals"]["discount"], "10.00");
    assert_eq!(cart["totals"]["shipping"], "5.00");
    assert_eq!(cart["totals"]["grand_total"], "40.00");

    let res = client.do_get("/shop/checkout").await.expect("Checkout page should load.");
    assert_eq!(res.status(), StatusCode::OK);

    let key = Uuid::now_v7();
    let confirmation = checkout(&client, Some(key)).await;
    assert_eq!(confirmation["replayed"], false);

    // The cart is empty and the coupon is gone.
    let cart = client
        .do_get("/shop/cart")
        .await
        .expect("Cart should load.")
        .json_body()
        .expect("Cart should be JSON.");
    assert_eq!(cart["lines"].as_array().map(Vec::len), Some(0));
    assert_eq!(cart["coupon_code"], serde_json::Value::Null);
    assert_eq!(cart["totals"]["discount"], "0.00");

    // Submitting again with the same key returns the same order.
    let replay = checkout(&client, Some(key)).await;
    assert_eq!(replay["replayed"], true);
    assert_eq!(replay["order_id"], confirmation["order_id"]);

    let orders = client
        .do_get("/accounts/client/orders")
        .await
        .expect("Orders should load.")
        .json_body()
        .expect("Orders should be JSON.");
    let orders = orders.as_array().expect("Orders should be a list.");
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["status"], "Pending");
    assert_eq!(orders[0]["payment_method"], "card");
    assert_eq!(orders[0]["coupon_code"], "SAVE10");
    assert_eq!(orders[0]["totals"]["grand_total"], "40.00");
    let quantities: Vec<(String, i64)> = orders[0]["lines"]
        .as_array()
        .expect("Lines should be a list.")
        .iter()
        .map(|line| {
            (
                line["name"].as_str().unwrap_or_default().to_owned(),
                line["quantity"].as_i64().unwrap_or_default(),
            )
        })
        .collect();
    assert_eq!(
        quantities,
        vec![("Mug".to_owned(), 2), ("Tea".to_owned(), 1)]
    );

    pool.close().await;
}

#[sqlx::test]
#[serial]
async fn checking_out_an_empty_cart_is_refused(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let client = new_client(&app_state);
    register(&client, "bob", "client").await;

    let res = client
        .do_post("/shop/checkout", json!({}))
        .await
        .expect("Checkout request should complete.");
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body = res.json_body().expect("Error should be JSON.");
    assert_eq!(body["message"], "Your cart is empty.");

    let orders: i64 = sqlx::query_scalar("SELECT count(*) FROM orders")
        .fetch_one(&app_state.pool)
        .await
        .expect("Orders should be counted.");
    assert_eq!(orders, 0);

    app_state.pool.close().await;
}

#[sqlx::test]
#[serial]
async fn an_unknown_coupon_resets_the_discount(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    upsert_coupon(&app_state.pool, "SAVE10", Decimal::TEN)
        .await
        .expect("Coupon should be created.");
    let client = new_client(&app_state);
    register(&client, "carol", "client").await;

    for (code, discount) in [("SAVE10", "10.00"), ("NOPE", "0.00"), ("NOPE", "0.00")] {
        let cart = client
            .do_post("/shop/cart/apply-coupon", json!({ "coupon_code": code }))
            .await
            .expect("Applying a coupon should succeed.")
            .json_body()
            .expect("Cart should be JSON.");
        assert_eq!(cart["totals"]["discount"], discount);
    }

    app_state.pool.close().await;
}
