use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use super::within_deadline;
use crate::application::ports::document_cache::{CacheKey, DocumentCache};
use crate::application::ports::document_repository::DocumentRepository;
use crate::domain::documents::DocumentError;

pub struct DeleteDocument<'a, R, C>
where
    R: DocumentRepository + ?Sized,
    C: DocumentCache + ?Sized,
{
    pub repo: &'a R,
    pub cache: &'a C,
    pub deadline: Option<Duration>,
}

impl<'a, R, C> DeleteDocument<'a, R, C>
where
    R: DocumentRepository + ?Sized,
    C: DocumentCache + ?Sized,
{
    pub async fn execute(&self, owner_id: i64, id: Uuid) -> Result<(), DocumentError> {
        within_deadline(self.deadline, self.repo.delete_owned(owner_id, id)).await?;
        self.cache.delete(&CacheKey::new(id, owner_id));
        info!(document_id = %id, owner_id, "document_deleted");
        Ok(())
    }
}
