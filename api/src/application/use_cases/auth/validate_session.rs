use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, warn};

use crate::application::ports::session_repository::SessionRepository;
use crate::domain::users::AuthError;

const EXPIRED_CLEANUP_TIMEOUT: Duration = Duration::from_secs(3);

/// Resolves a session token to its user id.
///
/// An expired token is rejected at once; its row is removed by a detached
/// task that the caller never waits on.
pub struct ValidateSession {
    pub sessions: Arc<dyn SessionRepository>,
}

impl ValidateSession {
    pub async fn execute(&self, token: &str) -> Result<i64, AuthError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(AuthError::InvalidToken);
        }
        let session = self
            .sessions
            .find_by_token(token)
            .await
            .map_err(AuthError::Backend)?
            .ok_or(AuthError::InvalidToken)?;

        if session.expire_at <= Utc::now() {
            let sessions = self.sessions.clone();
            let user_id = session.user_id;
            tokio::spawn(async move {
                match tokio::time::timeout(EXPIRED_CLEANUP_TIMEOUT, sessions.delete_for_user(user_id))
                    .await
                {
                    Ok(Ok(_)) => debug!(user_id, "expired_session_removed"),
                    Ok(Err(e)) => warn!(user_id, error = ?e, "expired_session_cleanup_failed"),
                    Err(_) => warn!(user_id, "expired_session_cleanup_timed_out"),
                }
            });
            return Err(AuthError::InvalidToken);
        }
        Ok(session.user_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::testing::InMemoryStore;

    #[tokio::test]
    async fn live_token_resolves_to_its_user() {
        let store = Arc::new(InMemoryStore::new());
        let alice = store.add_user("alice123");
        store.add_session(alice, "tok-1", Utc::now() + chrono::Duration::minutes(5));
        let uc = ValidateSession {
            sessions: store.clone(),
        };

        assert_eq!(uc.execute("tok-1").await.unwrap(), alice);
        assert!(matches!(
            uc.execute("missing").await,
            Err(AuthError::InvalidToken)
        ));
        assert!(matches!(uc.execute("  ").await, Err(AuthError::InvalidToken)));
    }

    #[tokio::test]
    async fn expired_token_is_rejected_and_cleaned_up_in_the_background() {
        let store = Arc::new(InMemoryStore::new());
        let alice = store.add_user("alice123");
        store.add_session(alice, "old", Utc::now() - chrono::Duration::seconds(1));
        let uc = ValidateSession {
            sessions: store.clone(),
        };

        assert!(matches!(uc.execute("old").await, Err(AuthError::InvalidToken)));
        for _ in 0..100 {
            if store.session_count() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(store.session_count(), 0);
    }
}
