use axum::http::StatusCode;
use rust_decimal::Decimal;
use serial_test::serial;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};

use crate::test_utils::{
    add_to_cart, checkout, create_product, new_client, register, start_test_server,
};

#[sqlx::test]
#[serial]
async fn only_the_owner_can_download_an_invoice(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let mug = create_product(&app_state.pool, "Mug", Decimal::new(800, 2)).await;

    let alice = new_client(&app_state);
    register(&alice, "alice", "client").await;
    add_to_cart(&alice, mug, 1).await;
    let confirmation = checkout(&alice, None).await;
    let order_id = confirmation["order_id"]
        .as_str()
        .expect("Order id should be a string.")
        .to_owned();
    let path = format!("/accounts/order/{order_id}/pdf");

    let res = alice.do_get(&path).await.expect("Invoice request should complete.");
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(res.header("content-type").as_deref(), Some("application/pdf"));
    assert_eq!(
        res.header("content-disposition"),
        Some(format!("attachment; filename=\"invoice_{order_id}.pdf\""))
    );

    let bob = new_client(&app_state);
    register(&bob, "bob", "client").await;
    let res = bob.do_get(&path).await.expect("Invoice request should complete.");
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    app_state.pool.close().await;
}

#[sqlx::test]
#[serial]
async fn staff_review_each_order_once(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let mug = create_product(&app_state.pool, "Mug", Decimal::new(800, 2)).await;

    let alice = new_client(&app_state);
    register(&alice, "alice", "client").await;
    add_to_cart(&alice, mug, 1).await;
    let order_id = checkout(&alice, None).await["order_id"]
        .as_str()
        .expect("Order id should be a string.")
        .to_owned();

    let staff = new_client(&app_state);
    register(&staff, "boss", "admin").await;
    let orders = staff
        .do_post(&format!("/accounts/admin/orders/{order_id}/accept"), serde_json::json!({}))
        .await
        .expect("Accept should complete.")
        .json_body()
        .expect("Orders should be JSON.");
    assert_eq!(orders[0]["status"], "Accepted");

    let again = staff
        .do_post(&format!("/accounts/admin/orders/{order_id}/reject"), serde_json::json!({}))
        .await
        .expect("Reject should complete.");
    assert_eq!(again.status(), StatusCode::CONFLICT);

    app_state.pool.close().await;
}
