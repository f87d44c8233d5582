//! Edit product slice

use std::sync::Arc;

use axum::{
    Json,
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
    ADMIN_PRODUCTS_PATH, CatalogError,
    add_product::{
        ProductCommand, ProductPayload, discard_images, discard_on_error, store_uploads,
    },
    image_store::ImageStore,
    products::{find_product, insert_gallery_image, update_product},
};

pub async fn edit_product_endpoint(
    State(pool): State<PgPool>,
    State(images): State<Arc<dyn ImageStore>>,
    StaffOnly(user): StaffOnly,
    Path(product_uuid): Path<Uuid>,
    Json(payload): Json<ProductPayload>,
) -> Result<Redirect, ClientError> {
    let product_id: ProductId = product_uuid.try_into()?;
    let command: ProductCommand = payload.try_into()?;

    let existing = find_product(&pool, &product_id)
        .await?
        .ok_or(CatalogError::ProductDoesNotExist(product_id))?;

    let stored = store_uploads(images.as_ref(), command.image.as_ref(), &command.gallery).await?;
    let replaced = stored.primary.as_ref().and(existing.image.clone());
    let image = stored.primary.clone().or(existing.image);
    let gallery = stored.gallery_for(product_id);
    let product = command.details.into_product(product_id, image);

    discard_on_error(images.as_ref(), &stored.paths(), async {
        let mut tx = pool.begin().await.map_err(anyhow::Error::new)?;
        if !update_product(&mut tx, &product).await? {
            return Err(ClientError::from(CatalogError::ProductDoesNotExist(product_id)));
        }
        for image in &gallery {
            insert_gallery_image(&mut tx, image).await?;
        }
        tx.commit().await.map_err(anyhow::Error::new)?;
        Ok(())
    })
    .await?;

    if let Some(replaced) = replaced {
        discard_images(images.as_ref(), &[replaced]).await;
    }
    info!("{} edited product {} ({})", user.username, product.name, product_id);

    Ok(Redirect::to(ADMIN_PRODUCTS_PATH))
}
