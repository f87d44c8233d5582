//! Catalog listing slice

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Serialize;
use sqlx::PgPool;

use crate::{
    domain::accounts::Authenticated,
    infra::ClientError,
};

use super::products::{Product, ProductFilter, filter_products};

#[derive(Debug, Serialize)]
pub struct ProductListView {
    pub products: Vec<Product>,
    pub filter: ProductFilter,
}

pub async fn product_list(
    State(pool): State<PgPool>,
    Authenticated(_): Authenticated,
    Query(filter): Query<ProductFilter>,
) -> Result<Json<ProductListView>, ClientError> {
    let products = filter_products(&pool, &filter).await?;
    Ok(Json(ProductListView { products, filter }))
}
