//! Staff order listing slice

use axum::{Json, extract::State};
use sqlx::PgPool;

use crate::{domain::accounts::StaffOnly, infra::ClientError};

use super::order_history::{OrderView, all_orders};

pub async fn admin_orders(
    State(pool): State<PgPool>,
    StaffOnly(_): StaffOnly,
) -> Result<Json<Vec<OrderView>>, ClientError> {
    let orders = all_orders(&pool).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}
