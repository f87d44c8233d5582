use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::json;
use serial_test::serial;
use sqlx::postgres::{PgConnectOptions, PgPoolOptions};
use uuid::Uuid;

use crate::test_utils::{create_product, new_client, register, start_test_server};

#[sqlx::test]
#[serial]
async fn clients_are_denied_every_staff_action(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let product_id = create_product(&app_state.pool, "Mug", Decimal::new(800, 2)).await;
    let client = new_client(&app_state);
    register(&client, "alice", "client").await;

    let order_id = Uuid::now_v7();
    let product_form = json!({ "name": "Poster", "price": "12.00" });
    let requests = [
        ("GET", "/accounts/admin/products".to_owned(), json!(null)),
        ("GET", "/accounts/admin/orders".to_owned(), json!(null)),
        ("GET", "/accounts/admin/users".to_owned(), json!(null)),
        ("POST", "/accounts/admin/product/add".to_owned(), product_form.clone()),
        (
            "POST",
            format!("/accounts/admin/product/edit/{product_id}"),
            product_form,
        ),
        (
            "POST",
            format!("/accounts/admin/product/delete/{product_id}"),
            json!({}),
        ),
        ("POST", format!("/accounts/admin/orders/{order_id}/accept"), json!({})),
        ("POST", format!("/accounts/admin/orders/{order_id}/reject"), json!({})),
    ];

    for (method, path, body) in requests {
        let res = match method {
            "GET" => client.do_get(&path).await,
            _ => client.do_post(&path, body).await,
        }
        .expect("Request should complete.");
        assert_eq!(res.status(), StatusCode::FORBIDDEN, "{method} {path}");
    }

    // Nothing was changed by the refused requests.
    let products: i64 = sqlx::query_scalar("SELECT count(*) FROM products")
        .fetch_one(&app_state.pool)
        .await
        .expect("Products should be counted.");
    assert_eq!(products, 1);

    app_state.pool.close().await;
}

#[sqlx::test]
#[serial]
async fn misrouted_dashboards_redirect_to_the_right_one(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;

    let client = new_client(&app_state);
    register(&client, "alice", "client").await;
    let body = client
        .do_get("/accounts/admin/dashboard")
        .await
        .expect("Request should complete.")
        .json_body()
        .expect("Dashboard should be JSON.");
    assert!(body.get("recently_viewed").is_some(), "Expected the client dashboard.");

    let staff = new_client(&app_state);
    let dashboard = register(&staff, "boss", "admin").await;
    assert_eq!(dashboard["total_users"], 2);
    let body = staff
        .do_get("/accounts/client/dashboard")
        .await
        .expect("Request should complete.")
        .json_body()
        .expect("Dashboard should be JSON.");
    assert!(body.get("total_products").is_some(), "Expected the admin dashboard.");

    app_state.pool.close().await;
}

#[sqlx::test]
#[serial]
async fn anonymous_visitors_are_sent_to_login(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;
    let client = new_client(&app_state);

    for path in ["/shop/", "/shop/cart", "/accounts/client/dashboard", "/accounts/admin/orders"] {
        let body = client
            .do_get(path)
            .await
            .expect("Request should complete.")
            .json_body()
            .expect("Login page should be JSON.");
        assert_eq!(body["form"], "login", "{path}");
    }

    app_state.pool.close().await;
}

#[sqlx::test]
#[serial]
async fn staff_manage_products_and_clients_see_them(
    _pool_options: PgPoolOptions,
    connect_options: PgConnectOptions,
) {
    let (_, app_state) = start_test_server(connect_options).await;

    let staff = new_client(&app_state);
    register(&staff, "boss", "admin").await;
    let res = staff
        .do_post(
            "/accounts/admin/product/add",
            json!({ "name": "Blue Mug", "price": "8.50", "category": "Kitchen" }),
        )
        .await
        .expect("Product should be added.");
    assert_eq!(res.json_body().expect("Dashboard should be JSON.")["total_products"], 1);

    let invalid = staff
        .do_post(
            "/accounts/admin/product/add",
            json!({ "name": " ", "price": "1.00" }),
        )
        .await
        .expect("Request should complete.");
    assert_eq!(invalid.status(), StatusCode::BAD_REQUEST);

    let client = new_client(&app_state);
    register(&client, "alice", "client").await;
    let listing = client
        .do_get("/shop/?search=mug&max_price=10")
        .await
        .expect("Catalog should load.")
        .json_body()
        .expect("Catalog should be JSON.");
    let products = listing["products"].as_array().expect("Products should be a list.");
    assert_eq!(products.len(), 1);
    let product_id = products[0]["product_id"]
        .as_str()
        .expect("Product id should be a string.")
        .to_owned();

    let detail = client
        .do_get(&format!("/shop/product/{product_id}"))
        .await
        .expect("Product should load.")
        .json_body()
        .expect("Product should be JSON.");
    assert_eq!(detail["product"]["name"], "Blue Mug");

    let dashboard = client
        .do_get("/accounts/client/dashboard")
        .await
        .expect("Dashboard should load.")
        .json_body()
        .expect("Dashboard should be JSON.");
    assert_eq!(dashboard["recently_viewed"][0]["product_id"], product_id.as_str());

    let deleted = staff
        .do_post(
            &format!("/accounts/admin/product/delete/{product_id}"),
            json!({}),
        )
        .await
        .expect("Product should be deleted.")
        .json_body()
        .expect("Product list should be JSON.");
    assert_eq!(deleted.as_array().map(Vec::len), Some(0));

    app_state.pool.close().await;
}
