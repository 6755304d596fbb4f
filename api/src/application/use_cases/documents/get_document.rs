use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, warn};
use uuid::Uuid;

use super::within_deadline;
use crate::application::ports::blob_store::BlobStore;
use crate::application::ports::document_cache::{CacheKey, DocumentCache};
use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::{DocumentError, DocumentPayload};

#[derive(Debug, Clone, PartialEq)]
pub enum DocumentContent {
    Binary { bytes: Vec<u8>, mime: String },
    Json(Value),
}

/// Read-through fetch of a document the requester owns.
pub struct GetDocument<'a, R, B, C>
where
    R: DocumentRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: DocumentCache + ?Sized,
{
    pub repo: &'a R,
    pub blobs: &'a B,
    pub cache: &'a C,
    pub cache_ttl: Duration,
    pub deadline: Option<Duration>,
}

impl<'a, R, B, C> GetDocument<'a, R, B, C>
where
    R: DocumentRepository + ?Sized,
    B: BlobStore + ?Sized,
    C: DocumentCache + ?Sized,
{
    pub async fn execute(&self, requester_id: i64, id: Uuid) -> Result<DocumentContent, DocumentError> {
        let key = CacheKey::new(id, requester_id);

        if let Some((bytes, mime)) = self.cache.get_binary(&key) {
            debug!(document_id = %id, user_id = requester_id, "cache_hit_binary");
            return Ok(DocumentContent::Binary { bytes, mime });
        }
        match self.cache.get_json(&key) {
            Ok(Some(value)) => {
                debug!(document_id = %id, user_id = requester_id, "cache_hit_json");
                return Ok(DocumentContent::Json(value));
            }
            Ok(None) => {}
            Err(e) => warn!(document_id = %id, user_id = requester_id, error = ?e, "cache_get_failed"),
        }

        let doc = within_deadline(self.deadline, self.repo.get_owned(requester_id, id)).await?;

        match doc.payload {
            DocumentPayload::File { locator } => {
                let bytes = self.blobs.read(&locator).await.map_err(|e| {
                    error!(document_id = %id, locator = %locator, error = ?e, "blob_read_failed");
                    DocumentError::Internal(format!("failed to read file: {e}"))
                })?;
                self.cache
                    .set_binary(key, bytes.clone(), doc.mime.clone(), self.cache_ttl);
                Ok(DocumentContent::Binary {
                    bytes,
                    mime: doc.mime,
                })
            }
            DocumentPayload::Json(value) => {
                if let Err(e) = self.cache.set_json(key, &value, self.cache_ttl) {
                    warn!(document_id = %id, user_id = requester_id, error = ?e, "cache_set_failed");
                }
                Ok(DocumentContent::Json(value))
            }
        }
    }
}
