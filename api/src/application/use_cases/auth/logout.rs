use std::sync::Arc;

use tracing::info;

use super::validate_session::ValidateSession;
use crate::application::ports::session_repository::SessionRepository;
use crate::domain::users::AuthError;

pub struct Logout {
    pub sessions: Arc<dyn SessionRepository>,
}

impl Logout {
    pub async fn execute(&self, token: &str) -> Result<(), AuthError> {
        let user_id = ValidateSession {
            sessions: self.sessions.clone(),
        }
        .execute(token)
        .await?;
        self.sessions
            .delete_for_user(user_id)
            .await
            .map_err(AuthError::Backend)?;
        info!(user_id, "session_closed");
        Ok(())
    }
}
