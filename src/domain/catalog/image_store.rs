//! Product image storage.

use anyhow::Context;
use async_trait::async_trait;
use base64::{Engine, engine::general_purpose::STANDARD};
use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::Deserialize;
use uuid::Uuid;

use super::CatalogError;

pub const PRIMARY_IMAGE_FOLDER: &str = "products/main";
pub const GALLERY_IMAGE_FOLDER: &str = "products/gallery";

/// An image sent by the admin forms, base64 encoded.
#[derive(Debug, Clone, Deserialize)]
pub struct ImageUpload {
    pub file_name: String,
    pub data: String,
}

impl ImageUpload {
    pub fn decode(&self) -> Result<Vec<u8>, CatalogError> {
        let bytes = STANDARD.decode(self.data.trim()).map_err(|_| {
            CatalogError::InvalidProduct(format!("Image {} is not valid base64.", self.file_name))
        })?;
        if bytes.is_empty() {
            return Err(CatalogError::InvalidProduct(format!(
                "Image {} is empty.",
                self.file_name
            )));
        }
        Ok(bytes)
    }
}

#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Stores the bytes and returns the path relative to the media root.
    async fn save(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<String, anyhow::Error>;

    async fn delete(&self, path: &str) -> Result<(), anyhow::Error>;
}

/// Stores images below the configured media directory.
#[derive(Debug, Clone)]
pub struct FsImageStore {
    root: Utf8PathBuf,
}

impl FsImageStore {
    pub fn new(root: impl Into<Utf8PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, relative: &str) -> Result<Utf8PathBuf, anyhow::Error> {
        let relative = Utf8Path::new(relative);
        let stays_inside = relative
            .components()
            .all(|component| matches!(component, Utf8Component::Normal(_)));
        if !stays_inside {
            anyhow::bail!("Refusing media path {relative} outside the media directory.");
        }
        Ok(self.root.join(relative))
    }
}

#[async_trait]
impl ImageStore for FsImageStore {
    async fn save(&self, folder: &str, file_name: &str, bytes: &[u8]) -> Result<String, anyhow::Error> {
        let relative = format!("{folder}/{}_{}", Uuid::now_v7().simple(), sanitize_file_name(file_name));
        let path = self.resolve(&relative)?;
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Could not create media directory {parent}."))?;
        }
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Could not write image {path}."))?;
        Ok(relative)
    }

    async fn delete(&self, path: &str) -> Result<(), anyhow::Error> {
        let path = self.resolve(path)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(anyhow::Error::new(e).context(format!("Could not delete image {path}."))),
        }
    }
}

/// Keeps ASCII alphanumerics, dots, dashes and underscores from the last path segment.
pub fn sanitize_file_name(file_name: &str) -> String {
    let last_segment = file_name.rsplit(['/', '\\']).next().unwrap_or_default();
    let cleaned: String = last_segment
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_start_matches('.');
    if cleaned.is_empty() {
        "image".to_owned()
    } else {
        cleaned.to_owned()
    }
}
