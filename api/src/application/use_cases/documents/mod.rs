pub mod create_document;
pub mod delete_document;
pub mod get_document;
pub mod list_documents;

use std::future::Future;
use std::time::Duration;

use crate::domain::documents::DocumentError;

/// Runs a backing-store call under an optional deadline. On expiry the call
/// is dropped and `Timeout` is returned.
pub async fn within_deadline<T, F>(deadline: Option<Duration>, fut: F) -> Result<T, DocumentError>
where
    F: Future<Output = Result<T, DocumentError>>,
{
    match deadline {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| DocumentError::Timeout)?,
        None => fut.await,
    }
}
