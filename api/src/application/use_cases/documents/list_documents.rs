use std::time::Duration;

use tracing::{debug, warn};

use super::within_deadline;
use crate::application::access::{self, DocumentAccess};
use crate::application::ports::document_repository::DocumentRepository;
use crate::application::ports::identity_resolver::IdentityResolver;
use crate::domain::documents::document::sort_for_listing;
use crate::domain::documents::{DocumentError, DocumentSummary, ListFilter, ListScope};

#[derive(Debug, Clone)]
pub struct ListDocumentsQuery {
    pub requester_id: i64,
    pub key: String,
    pub value: String,
    /// Whose library to browse; `None` lists the requester's own documents.
    pub login: Option<String>,
    pub limit: i64,
}

pub struct ListDocuments<'a, R, I>
where
    R: DocumentRepository + ?Sized,
    I: IdentityResolver + ?Sized,
{
    pub repo: &'a R,
    pub identities: &'a I,
    pub deadline: Option<Duration>,
}

impl<'a, R, I> ListDocuments<'a, R, I>
where
    R: DocumentRepository + ?Sized,
    I: IdentityResolver + ?Sized,
{
    pub async fn execute(&self, q: &ListDocumentsQuery) -> Result<Vec<DocumentSummary>, DocumentError> {
        let (column, value) = ListFilter::parse_condition(&q.key, &q.value)?;
        if q.limit <= 0 {
            return Err(DocumentError::InvalidFilter("limit must be positive".into()));
        }

        let login = q.login.as_deref().map(str::trim).filter(|l| !l.is_empty());
        let scope = match login {
            None => ListScope::Owner,
            Some(login) => {
                let resolved = within_deadline(self.deadline, async {
                    self.identities
                        .resolve_username(login)
                        .await
                        .map_err(|e| DocumentError::BackendUnavailable(e.to_string()))
                })
                .await?;
                match resolved {
                    Some(owner_id) => ListScope::Shared { owner_id },
                    None => {
                        debug!(login = %login, "list_unknown_owner");
                        return Ok(Vec::new());
                    }
                }
            }
        };

        let filter = ListFilter {
            column,
            value,
            scope,
            limit: q.limit,
        };
        let mut docs = within_deadline(self.deadline, self.repo.list(q.requester_id, &filter)).await?;

        let fetched = docs.len();
        docs.retain(|d| {
            access::admits(
                &filter.scope,
                &DocumentAccess::from(d),
                q.requester_id,
                &d.granted_user_ids,
            )
        });
        if docs.len() != fetched {
            warn!(
                user_id = q.requester_id,
                dropped = fetched - docs.len(),
                "list_rows_rejected_by_access_check"
            );
        }
        sort_for_listing(&mut docs);
        Ok(docs)
    }
}
