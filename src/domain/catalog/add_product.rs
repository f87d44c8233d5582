//! Add product slice

use std::sync::Arc;

use axum::{Json, extract::State, response::Redirect};
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::{
    domain::{
        ProductId, ProductImageId,
        accounts::{STAFF_DASHBOARD_PATH, StaffOnly},
    },
    infra::ClientError,
};

use super::{
    CatalogError,
    image_store::{GALLERY_IMAGE_FOLDER, ImageStore, ImageUpload, PRIMARY_IMAGE_FOLDER},
    products::{Product, ProductImage, insert_gallery_image, insert_product},
};

const MAX_NAME_LENGTH: usize = 200;
const MAX_CATEGORY_LENGTH: usize = 100;
const MAX_PRICE: Decimal = Decimal::from_parts(1_410_065_408, 2, 0, false, 0);

//------------------------- Web API ----------------------------

#[derive(Debug, Clone, serde::Deserialize)]
pub struct ProductPayload {
    pub name: String,
    pub price: Decimal,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub image: Option<ImageUpload>,
    #[serde(default)]
    pub gallery: Vec<ImageUpload>,
}

pub async fn add_product_endpoint(
    State(pool): State<PgPool>,
    State(images): State<Arc<dyn ImageStore>>,
    StaffOnly(user): StaffOnly,
    Json(payload): Json<ProductPayload>,
) -> Result<Redirect, ClientError> {
    let command: ProductCommand = payload.try_into()?;
    let product_id = ProductId::new();

    let stored = store_uploads(images.as_ref(), command.image.as_ref(), &command.gallery).await?;
    let gallery = stored.gallery_for(product_id);
    let product = command.details.into_product(product_id, stored.primary.clone());

    discard_on_error(images.as_ref(), &stored.paths(), async {
        let mut tx = pool.begin().await.map_err(anyhow::Error::new)?;
        insert_product(&mut tx, &product).await?;
        for image in &gallery {
            insert_gallery_image(&mut tx, image).await?;
        }
        tx.commit().await.map_err(anyhow::Error::new)?;
        Ok::<_, ClientError>(())
    })
    .await?;

    info!(
        "{} added product {} ({}) with {} gallery images",
        user.username,
        product.name,
        product.product_id,
        gallery.len()
    );

    Ok(Redirect::to(STAFF_DASHBOARD_PATH))
}

/// Media paths saved while handling one add or edit request.
#[derive(Debug, Default, PartialEq)]
pub(super) struct StoredUploads {
    pub primary: Option<String>,
    pub gallery: Vec<String>,
}

impl StoredUploads {
    pub fn paths(&self) -> Vec<String> {
        self.primary.iter().chain(&self.gallery).cloned().collect()
    }

    pub fn gallery_for(&self, product_id: ProductId) -> Vec<ProductImage> {
        self.gallery
            .iter()
            .map(|image| ProductImage {
                image_id: ProductImageId::new(),
                product_id,
                image: image.clone(),
            })
            .collect()
    }
}

/// Saves the uploads. When one save fails the files already written are removed.
pub(super) async fn store_uploads(
    images: &dyn ImageStore,
    primary: Option<&DecodedImage>,
    gallery: &[DecodedImage],
) -> Result<StoredUploads, ClientError> {
    let mut stored = StoredUploads::default();
    let uploads = primary
        .map(|upload| (PRIMARY_IMAGE_FOLDER, upload))
        .into_iter()
        .chain(gallery.iter().map(|upload| (GALLERY_IMAGE_FOLDER, upload)));

    for (folder, upload) in uploads {
        match images.save(folder, &upload.file_name, &upload.bytes).await {
            Ok(path) if folder == PRIMARY_IMAGE_FOLDER => stored.primary = Some(path),
            Ok(path) => stored.gallery.push(path),
            Err(e) => {
                discard_images(images, &stored.paths()).await;
                return Err(e.into());
            }
        }
    }
    Ok(stored)
}

/// Runs `persist`, removing the `stored` files if it fails.
pub(super) async fn discard_on_error<T>(
    images: &dyn ImageStore,
    stored: &[String],
    persist: impl Future<Output = Result<T, ClientError>>,
) -> Result<T, ClientError> {
    let result = persist.await;
    if result.is_err() {
        discard_images(images, stored).await;
    }
    result
}

/// Removes stored files, logging failures instead of failing the request.
pub(super) async fn discard_images(images: &dyn ImageStore, paths: &[String]) {
    for path in paths {
        if let Err(e) = images.delete(path).await {
            warn!("Could not remove image {path}: {e:?}");
        }
    }
}

//------------------------- Command ----------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ProductDetails {
    pub name: String,
    pub price: Decimal,
    pub description: String,
    pub category: String,
}

impl ProductDetails {
    pub fn into_product(self, product_id: ProductId, image: Option<String>) -> Product {
        Product {
            product_id,
            name: self.name,
            price: self.price,
            description: self.description,
            category: self.category,
            image,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

/// A validated add or edit form.
#[derive(Debug, Clone, PartialEq)]
pub struct ProductCommand {
    pub details: ProductDetails,
    pub image: Option<DecodedImage>,
    pub gallery: Vec<DecodedImage>,
}

impl TryFrom<ProductPayload> for ProductCommand {
    type Error = CatalogError;

    fn try_from(payload: ProductPayload) -> Result<Self, Self::Error> {
        let name = payload.name.trim();
        if name.is_empty() {
            return Err(CatalogError::InvalidProduct("Name is required.".to_owned()));
        }
        if name.chars().count() > MAX_NAME_LENGTH {
            return Err(CatalogError::InvalidProduct(format!(
                "Name must be at most {MAX_NAME_LENGTH} characters."
            )));
        }

        let category = payload.category.trim();
        if category.chars().count() > MAX_CATEGORY_LENGTH {
            return Err(CatalogError::InvalidProduct(format!(
                "Category must be at most {MAX_CATEGORY_LENGTH} characters."
            )));
        }

        if payload.price < Decimal::ZERO {
            return Err(CatalogError::InvalidProduct(
                "Price cannot be negative.".to_owned(),
            ));
        }
        let price = payload.price.normalize();
        if price.scale() > 2 {
            return Err(CatalogError::InvalidProduct(
                "Price can have at most two decimal places.".to_owned(),
            ));
        }
        if price >= MAX_PRICE {
            return Err(CatalogError::InvalidProduct("Price is too large.".to_owned()));
        }

        let decode = |upload: &ImageUpload| -> Result<DecodedImage, CatalogError> {
            Ok(DecodedImage {
                file_name: upload.file_name.clone(),
                bytes: upload.decode()?,
            })
        };

        Ok(Self {
            details: ProductDetails {
                name: name.to_owned(),
                price,
                description: payload.description.trim().to_owned(),
                category: category.to_owned(),
            },
            image: payload.image.as_ref().map(decode).transpose()?,
            gallery: payload.gallery.iter().map(decode).collect::<Result<_, _>>()?,
        })
    }
}

//-------------------------- Tests -------------------------------

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use base64::{Engine, engine::general_purpose::STANDARD};

    use super::*;

    /// Records saves and deletes. Saves fail once `fail_after` files are stored.
    #[derive(Default)]
    struct RecordingStore {
        fail_after: Option<usize>,
        saved: Mutex<Vec<String>>,
        deleted: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for RecordingStore {
        async fn save(
            &self,
            folder: &str,
            file_name: &str,
            _bytes: &[u8],
        ) -> Result<String, anyhow::Error> {
            let mut saved = self.saved.lock().unwrap();
            if self.fail_after == Some(saved.len()) {
                anyhow::bail!("Disk full.");
            }
            let path = format!("{folder}/{file_name}");
            saved.push(path.clone());
            Ok(path)
        }

        async fn delete(&self, path: &str) -> Result<(), anyhow::Error> {
            self.deleted.lock().unwrap().push(path.to_owned());
            Ok(())
        }
    }

    fn image(file_name: &str) -> DecodedImage {
        DecodedImage {
            file_name: file_name.to_owned(),
            bytes: b"bytes".to_vec(),
        }
    }

    fn payload() -> ProductPayload {
        ProductPayload {
            name: " Mug ".to_owned(),
            price: Decimal::new(1250, 2),
            description: "Ceramic".to_owned(),
            category: "Kitchen".to_owned(),
            image: None,
            gallery: vec![],
        }
    }

    #[test]
    fn valid_payload_is_trimmed() {
        let command = ProductCommand::try_from(payload()).unwrap();

        assert_eq!(command.details.name, "Mug");
        assert_eq!(command.details.price, Decimal::new(1250, 2));
    }

    #[test]
    fn name_is_required() {
        let result = ProductCommand::try_from(ProductPayload {
            name: "   ".to_owned(),
            ..payload()
        });

        assert_eq!(
            result,
            Err(CatalogError::InvalidProduct("Name is required.".to_owned()))
        );
    }

    #[test]
    fn price_cannot_be_negative() {
        let result = ProductCommand::try_from(ProductPayload {
            price: Decimal::new(-1, 2),
            ..payload()
        });

        assert!(matches!(result, Err(CatalogError::InvalidProduct(_))));
    }

    #[test]
    fn free_products_are_allowed() {
        let command = ProductCommand::try_from(ProductPayload {
            price: Decimal::ZERO,
            ..payload()
        })
        .unwrap();

        assert_eq!(command.details.price, Decimal::ZERO);
    }

    #[test]
    fn price_precision_is_limited_to_cents() {
        let result = ProductCommand::try_from(ProductPayload {
            price: Decimal::new(12345, 3),
            ..payload()
        });
        assert!(matches!(result, Err(CatalogError::InvalidProduct(_))));

        let command = ProductCommand::try_from(ProductPayload {
            price: Decimal::new(12500, 3),
            ..payload()
        })
        .unwrap();
        assert_eq!(command.details.price, Decimal::new(125, 1));
    }

    #[test]
    fn uploads_are_decoded() {
        let command = ProductCommand::try_from(ProductPayload {
            gallery: vec![ImageUpload {
                file_name: "side.png".to_owned(),
                data: STANDARD.encode(b"side"),
            }],
            ..payload()
        })
        .unwrap();

        assert_eq!(command.gallery[0].bytes, b"side");
    }

    #[tokio::test]
    async fn failed_gallery_save_removes_the_primary_image() {
        let store = RecordingStore {
            fail_after: Some(1),
            ..Default::default()
        };

        let result = store_uploads(&store, Some(&image("main.png")), &[image("side.png")]).await;

        assert!(result.is_err());
        assert_eq!(*store.saved.lock().unwrap(), ["products/main/main.png"]);
        assert_eq!(*store.deleted.lock().unwrap(), ["products/main/main.png"]);
    }

    #[tokio::test]
    async fn uploads_are_split_into_primary_and_gallery() {
        let store = RecordingStore::default();

        let stored = store_uploads(&store, Some(&image("main.png")), &[image("side.png")])
            .await
            .unwrap();

        assert_eq!(stored.primary.as_deref(), Some("products/main/main.png"));
        assert_eq!(stored.gallery, ["products/gallery/side.png"]);
        assert!(store.deleted.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn failed_persist_removes_every_stored_image() {
        let store = RecordingStore::default();
        let stored = store_uploads(&store, Some(&image("main.png")), &[image("side.png")])
            .await
            .unwrap();

        let result = discard_on_error(&store, &stored.paths(), async {
            Err::<(), _>(ClientError::from(CatalogError::ProductDoesNotExist(
                ProductId::new(),
            )))
        })
        .await;

        assert!(matches!(
            result,
            Err(ClientError::Catalog(CatalogError::ProductDoesNotExist(_)))
        ));
        assert_eq!(*store.deleted.lock().unwrap(), stored.paths());
    }

    #[tokio::test]
    async fn successful_persist_keeps_the_images() {
        let store = RecordingStore::default();
        let stored = store_uploads(&store, None, &[image("side.png")]).await.unwrap();

        discard_on_error(&store, &stored.paths(), async { Ok::<_, ClientError>(()) })
            .await
            .unwrap();

        assert!(store.deleted.lock().unwrap().is_empty());
    }
}
