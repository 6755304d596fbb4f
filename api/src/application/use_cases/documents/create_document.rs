use std::time::Duration;

use serde_json::Value;
use tracing::{info, warn};
use uuid::Uuid;

use super::within_deadline;
use crate::application::ports::blob_store::{BlobStore, BlobStoreError};
use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::document::normalize_grantees;
use crate::domain::documents::{DEFAULT_JSON_MIME, DocumentError, DocumentPayload, NewDocument};

#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub bytes: Vec<u8>,
    pub filename: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CreateDocumentRequest {
    pub owner_id: i64,
    pub name: String,
    pub mime: Option<String>,
    pub public: bool,
    /// Declared payload kind; must agree with the parts actually sent.
    pub is_file: bool,
    pub grants: Vec<String>,
    pub json: Option<Value>,
    pub file: Option<UploadedFile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreatedDocument {
    pub id: Uuid,
    pub name: String,
    pub json: Option<Value>,
}

pub struct CreateDocument<'a, R, B>
where
    R: DocumentRepository + ?Sized,
    B: BlobStore + ?Sized,
{
    pub repo: &'a R,
    pub blobs: &'a B,
    pub deadline: Option<Duration>,
}

impl<'a, R, B> CreateDocument<'a, R, B>
where
    R: DocumentRepository + ?Sized,
    B: BlobStore + ?Sized,
{
    pub async fn execute(&self, req: CreateDocumentRequest) -> Result<CreatedDocument, DocumentError> {
        let name = req.name.trim().to_string();
        if name.is_empty() {
            return Err(DocumentError::InvalidPayload("name is required".into()));
        }

        let (payload, mime) = match (req.json.filter(|v| !v.is_null()), req.file) {
            (Some(json), None) if !req.is_file => {
                let mime = req
                    .mime
                    .filter(|m| !m.trim().is_empty())
                    .unwrap_or_else(|| DEFAULT_JSON_MIME.to_string());
                (DocumentPayload::Json(json), mime)
            }
            (None, Some(file)) if req.is_file => {
                if file.bytes.is_empty() {
                    return Err(DocumentError::InvalidPayload("file is empty".into()));
                }
                // the blob lands before the row; a failed insert leaves it orphaned
                let stored = self
                    .blobs
                    .store(&file.bytes, file.filename.as_deref())
                    .await
                    .map_err(|e| match e {
                        BlobStoreError::UnsupportedMediaType(mime) => {
                            DocumentError::UnsupportedMediaType(mime)
                        }
                        other => {
                            warn!(owner_id = req.owner_id, error = ?other, "blob_store_failed");
                            DocumentError::Internal(format!("failed to store file: {other}"))
                        }
                    })?;
                (
                    DocumentPayload::File {
                        locator: stored.locator,
                    },
                    stored.mime,
                )
            }
            (None, None) => {
                return Err(DocumentError::InvalidPayload(
                    "either json or file is required".into(),
                ));
            }
            _ => {
                return Err(DocumentError::InvalidPayload(
                    "exactly one of json or file must match meta.file".into(),
                ));
            }
        };

        let json = payload.json_column().cloned();
        let doc = NewDocument {
            owner_id: req.owner_id,
            name: name.clone(),
            mime,
            public: req.public,
            payload,
            grants: normalize_grantees(&req.grants),
        };
        let id = within_deadline(self.deadline, self.repo.create(&doc)).await?;
        info!(document_id = %id, owner_id = doc.owner_id, is_file = doc.payload.is_file(), "document_created");

        Ok(CreatedDocument { id, name, json })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::{InMemoryStore, MemBlobStore, png_bytes};
    use serde_json::json;

    fn request(owner_id: i64) -> CreateDocumentRequest {
        CreateDocumentRequest {
            owner_id,
            name: "report".into(),
            mime: None,
            public: false,
            is_file: false,
            grants: vec![],
            json: None,
            file: None,
        }
    }

    fn use_case<'a>(
        store: &'a InMemoryStore,
        blobs: &'a MemBlobStore,
    ) -> CreateDocument<'a, InMemoryStore, MemBlobStore> {
        CreateDocument {
            repo: store,
            blobs,
            deadline: None,
        }
    }

    #[tokio::test]
    async fn json_document_is_created_with_default_mime_and_grants() {
        let store = InMemoryStore::new();
        let blobs = MemBlobStore::new();
        let owner = store.add_user("alice123");
        let bob = store.add_user("bob12345");

        let created = use_case(&store, &blobs)
            .execute(CreateDocumentRequest {
                json: Some(json!({"k": "v"})),
                grants: vec!["bob12345".into(), " bob12345 ".into(), "ghost999".into()],
                ..request(owner)
            })
            .await
            .unwrap();

        assert_eq!(created.json, Some(json!({"k": "v"})));
        assert_eq!(created.name, "report");
        assert!(store.document_exists(created.id));
        assert_eq!(store.grants_for(created.id), vec![bob]);
        assert_eq!(blobs.len(), 0);
    }

    #[tokio::test]
    async fn missing_or_double_payload_is_rejected_before_any_store_call() {
        let store = InMemoryStore::new();
        let blobs = MemBlobStore::new();
        let owner = store.add_user("alice123");
        let uc = use_case(&store, &blobs);

        let none = uc.execute(request(owner)).await;
        assert!(matches!(none, Err(DocumentError::InvalidPayload(_))));

        let both = uc
            .execute(CreateDocumentRequest {
                is_file: true,
                json: Some(json!({})),
                file: Some(UploadedFile {
                    bytes: png_bytes(),
                    filename: None,
                }),
                ..request(owner)
            })
            .await;
        assert!(matches!(both, Err(DocumentError::InvalidPayload(_))));

        let mismatched = uc
            .execute(CreateDocumentRequest {
                is_file: true,
                json: Some(json!({})),
                ..request(owner)
            })
            .await;
        assert!(matches!(mismatched, Err(DocumentError::InvalidPayload(_))));

        assert_eq!(store.repo_calls(), 0);
        assert_eq!(blobs.len(), 0);
    }

    #[tokio::test]
    async fn file_is_stored_before_the_row_with_the_sniffed_mime() {
        let store = InMemoryStore::new();
        let blobs = MemBlobStore::new();
        let owner = store.add_user("alice123");

        let created = use_case(&store, &blobs)
            .execute(CreateDocumentRequest {
                is_file: true,
                mime: Some("text/plain".into()),
                file: Some(UploadedFile {
                    bytes: png_bytes(),
                    filename: Some("pic.png".into()),
                }),
                ..request(owner)
            })
            .await
            .unwrap();

        assert_eq!(created.json, None);
        assert_eq!(blobs.len(), 1);
        let doc = store.get_owned(owner, created.id).await.unwrap();
        assert_eq!(doc.mime, "image/png");
        assert!(doc.payload.is_file());
    }

    #[tokio::test]
    async fn unsupported_content_never_reaches_the_repository() {
        let store = InMemoryStore::new();
        let blobs = MemBlobStore::new();
        let owner = store.add_user("alice123");

        let res = use_case(&store, &blobs)
            .execute(CreateDocumentRequest {
                is_file: true,
                file: Some(UploadedFile {
                    bytes: b"plain text pretending to be a picture".to_vec(),
                    filename: Some("pic.png".into()),
                }),
                ..request(owner)
            })
            .await;

        assert!(matches!(res, Err(DocumentError::UnsupportedMediaType(_))));
        assert_eq!(store.repo_calls(), 0);
    }

    #[tokio::test]
    async fn backend_failure_surfaces_unchanged() {
        let store = InMemoryStore::new();
        let blobs = MemBlobStore::new();
        let owner = store.add_user("alice123");
        store.set_unavailable(true);

        let res = use_case(&store, &blobs)
            .execute(CreateDocumentRequest {
                json: Some(json!([1, 2, 3])),
                ..request(owner)
            })
            .await;
        assert!(matches!(res, Err(DocumentError::BackendUnavailable(_))));
    }
}
