//! Product detail slice

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Serialize;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    domain::{ProductId, ShopSession, accounts::Authenticated},
    infra::ClientError,
};

use super::{
    CatalogError,
    products::{Product, ProductImage, find_product, product_gallery},
};

#[derive(Debug, Serialize)]
pub struct ProductDetailView {
    pub product: Product,
    pub gallery: Vec<ProductImage>,
}

pub async fn product_detail(
    State(pool): State<PgPool>,
    session: ShopSession,
    Authenticated(_): Authenticated,
    Path(product_uuid): Path<Uuid>,
) -> Result<Json<ProductDetailView>, ClientError> {
    let product_id: ProductId = product_uuid.try_into()?;
    let product = find_product(&pool, &product_id)
        .await?
        .ok_or(CatalogError::ProductDoesNotExist(product_id))?;
    let gallery = product_gallery(&pool, &product_id).await?;

    session.record_view(product_id).await?;

    Ok(Json(ProductDetailView { product, gallery }))
}
