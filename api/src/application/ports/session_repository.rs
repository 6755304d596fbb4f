use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[derive(Debug, Clone)]
pub struct SessionRow {
    pub token_id: i64,
    pub user_id: i64,
    pub created_at: DateTime<Utc>,
    pub expire_at: DateTime<Utc>,
}

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Stores the token as the user's only session, replacing any previous one.
    async fn upsert_session(
        &self,
        user_id: i64,
        token: &str,
        created_at: DateTime<Utc>,
        expire_at: DateTime<Utc>,
    ) -> anyhow::Result<()>;
    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<SessionRow>>;
    async fn delete_for_user(&self, user_id: i64) -> anyhow::Result<bool>;
}
