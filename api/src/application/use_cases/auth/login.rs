use std::time::Duration;

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordVerifier},
};
use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use crate::application::ports::session_repository::SessionRepository;
use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::AuthError;

pub struct Login<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub users: &'a U,
    pub sessions: &'a S,
    pub session_ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct LoginRequest {
    pub login: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct IssuedSession {
    pub token: String,
    pub user_id: i64,
    pub expire_at: DateTime<Utc>,
}

impl<'a, U, S> Login<'a, U, S>
where
    U: UserRepository + ?Sized,
    S: SessionRepository + ?Sized,
{
    pub async fn execute(&self, req: &LoginRequest) -> Result<IssuedSession, AuthError> {
        let row = self
            .users
            .find_by_username(&req.login)
            .await
            .map_err(AuthError::Backend)?
            .ok_or(AuthError::InvalidCredentials)?;
        let hash = row.pass_hash.unwrap_or_default();
        let parsed = PasswordHash::new(&hash)
            .map_err(|e| AuthError::Backend(anyhow::anyhow!(e.to_string())))?;
        if Argon2::default()
            .verify_password(req.password.as_bytes(), &parsed)
            .is_err()
        {
            return Err(AuthError::InvalidCredentials);
        }

        let ttl = chrono::Duration::from_std(self.session_ttl)
            .map_err(|e| AuthError::Backend(anyhow::anyhow!(e)))?;
        let token = Uuid::new_v4().to_string();
        let created_at = Utc::now();
        let expire_at = created_at
            .checked_add_signed(ttl)
            .ok_or_else(|| AuthError::Backend(anyhow::anyhow!("session ttl out of range")))?;
        self.sessions
            .upsert_session(row.id, &token, created_at, expire_at)
            .await
            .map_err(AuthError::Backend)?;
        info!(user_id = row.id, "session_issued");
        Ok(IssuedSession {
            token,
            user_id: row.id,
            expire_at,
        })
    }
}
