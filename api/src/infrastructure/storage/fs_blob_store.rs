use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tracing::debug;
use uuid::Uuid;

use super::sniff;
use crate::application::ports::blob_store::{BlobStore, BlobStoreError, StoredBlob};

/// Stores uploads as flat `{uuid}.{ext}` files under one directory.
pub struct FsBlobStore {
    pub root: PathBuf,
}

impl FsBlobStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub async fn ensure_root(&self) -> std::io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await
    }

    // A locator must be a single plain file name.
    fn resolve(&self, locator: &str) -> Result<PathBuf, BlobStoreError> {
        let mut components = Path::new(locator).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(name)), None) => Ok(self.root.join(name)),
            _ => Err(BlobStoreError::InvalidLocator),
        }
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn store(
        &self,
        bytes: &[u8],
        original_filename: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError> {
        let mime = sniff::detect_mime(bytes).ok_or_else(|| {
            let guessed = original_filename
                .and_then(|name| mime_guess::from_path(name).first())
                .map(|m| m.essence_str().to_string())
                .unwrap_or_else(|| "application/octet-stream".to_string());
            BlobStoreError::UnsupportedMediaType(guessed)
        })?;
        let ext = sniff::extension_for(mime, original_filename);
        let locator = format!("{}.{}", Uuid::new_v4(), ext);

        self.ensure_root().await.map_err(BlobStoreError::Io)?;
        tokio::fs::write(self.root.join(&locator), bytes)
            .await
            .map_err(BlobStoreError::Io)?;
        debug!(locator = %locator, mime, size = bytes.len(), "blob_stored");

        Ok(StoredBlob {
            locator,
            mime: mime.to_string(),
        })
    }

    async fn read(&self, locator: &str) -> Result<Vec<u8>, BlobStoreError> {
        let path = self.resolve(locator)?;
        tokio::fs::read(&path).await.map_err(|e| match e.kind() {
            ErrorKind::NotFound => BlobStoreError::NotFound,
            _ => BlobStoreError::Io(e),
        })
    }
}
