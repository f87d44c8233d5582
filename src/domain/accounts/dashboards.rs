//! Client and admin dashboards.

use axum::{Json, extract::State};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    domain::{
        ShopSession,
        catalog::{Product, count_products, find_products_by_ids, list_products},
        orders::order_counts,
    },
    infra::ClientError,
};

use super::{ClientPage, StaffPage, users::count_users};

//------------------------- Web API ----------------------------

#[derive(Debug, Serialize)]
pub struct ClientDashboard {
    pub username: String,
    pub products: Vec<Product>,
    pub recently_viewed: Vec<Product>,
}

#[derive(Debug, Serialize)]
pub struct AdminDashboard {
    pub username: String,
    pub total_products: i64,
    pub total_orders: i64,
    pub pending_orders: i64,
    pub total_users: i64,
}

pub async fn client_dashboard(
    State(pool): State<PgPool>,
    session: ShopSession,
    ClientPage(user): ClientPage,
) -> Result<Json<ClientDashboard>, ClientError> {
    let products = list_products(&pool).await?;
    let recently_viewed = session.recently_viewed().await?;
    let recently_viewed = find_products_by_ids(&pool, recently_viewed.ids()).await?;

    Ok(Json(ClientDashboard {
        username: user.username,
        products,
        recently_viewed,
    }))
}

pub async fn admin_dashboard(
    State(pool): State<PgPool>,
    StaffPage(user): StaffPage,
) -> Result<Json<AdminDashboard>, ClientError> {
    let orders = order_counts(&pool).await?;

    Ok(Json(AdminDashboard {
        username: user.username,
        total_products: count_products(&pool).await?,
        total_orders: orders.total,
        pending_orders: orders.pending,
        total_users: count_users(&pool).await?,
    }))
}
