//! Client order history slice

use axum::{Json, extract::State};
use sqlx::PgPool;

use crate::{domain::accounts::ClientPage, infra::ClientError};

use super::order_history::{OrderView, orders_for_user};

pub async fn client_orders(
    State(pool): State<PgPool>,
    ClientPage(user): ClientPage,
) -> Result<Json<Vec<OrderView>>, ClientError> {
    let orders = orders_for_user(&pool, &user.user_id).await?;
    Ok(Json(orders.iter().map(OrderView::from).collect()))
}
