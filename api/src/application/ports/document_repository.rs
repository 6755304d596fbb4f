use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::documents::{
    Document, DocumentError, DocumentSummary, ListFilter, NewDocument,
};

#[async_trait]
pub trait DocumentRepository: Send + Sync {
    /// Inserts the document and its grants in one transaction and returns the
    /// generated id. Unknown grant usernames are skipped.
    async fn create(&self, doc: &NewDocument) -> Result<Uuid, DocumentError>;

    // Owner-only: a missing row and a row owned by someone else both yield NotFound.
    async fn get_owned(&self, requester_id: i64, id: Uuid) -> Result<Document, DocumentError>;

    async fn list(
        &self,
        requester_id: i64,
        filter: &ListFilter,
    ) -> Result<Vec<DocumentSummary>, DocumentError>;

    // Zero affected rows => Forbidden
    async fn delete_owned(&self, owner_id: i64, id: Uuid) -> Result<(), DocumentError>;
}
