//! Users list slice

use axum::{Json, extract::State};
use sqlx::PgPool;

use crate::infra::ClientError;

use super::{
    StaffOnly,
    users::{User, list_users},
};

pub async fn users_list(
    State(pool): State<PgPool>,
    StaffOnly(_): StaffOnly,
) -> Result<Json<Vec<User>>, ClientError> {
    Ok(Json(list_users(&pool).await?))
}
