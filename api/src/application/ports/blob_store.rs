use async_trait::async_trait;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub locator: String,
    pub mime: String,
}

#[derive(thiserror::Error, Debug)]
pub enum BlobStoreError {
    #[error("unsupported media type {0}")]
    UnsupportedMediaType(String),
    #[error("invalid blob locator")]
    InvalidLocator,
    #[error("blob not found")]
    NotFound,
    #[error("blob storage failure")]
    Io(#[source] std::io::Error),
}

/// Binary payload storage. Only content-sniffed JPEG, PNG and MP4 are accepted.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn store(
        &self,
        bytes: &[u8],
        original_filename: Option<&str>,
    ) -> Result<StoredBlob, BlobStoreError>;
    async fn read(&self, locator: &str) -> Result<Vec<u8>, BlobStoreError>;
}
