//! Staff product listing slice

use axum::{Json, extract::State};
use sqlx::PgPool;

use crate::{domain::accounts::StaffOnly, infra::ClientError};

use super::products::{Product, list_products};

pub async fn admin_products(
    State(pool): State<PgPool>,
    StaffOnly(_): StaffOnly,
) -> Result<Json<Vec<Product>>, ClientError> {
    Ok(Json(list_products(&pool).await?))
}
