//! Delete product slice

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::{
    domain::{ProductId, accounts::StaffOnly},
    infra::ClientError,
};

use super::{
    ADMIN_PRODUCTS_PATH, CatalogError, add_product::discard_images, image_store::ImageStore,
    products::delete_product,
};

pub async fn delete_product_endpoint(
    State(pool): State<PgPool>,
    State(images): State<Arc<dyn ImageStore>>,
    StaffOnly(user): StaffOnly,
    Path(product_uuid): Path<Uuid>,
) -> Result<Redirect, ClientError> {
    let product_id: ProductId = product_uuid.try_into()?;

    let paths = delete_product(&pool, &product_id)
        .await?
        .ok_or(CatalogError::ProductDoesNotExist(product_id))?;
    discard_images(images.as_ref(), &paths).await;

    info!("{} deleted product {product_id}", user.username);
    Ok(Redirect::to(ADMIN_PRODUCTS_PATH))
}
