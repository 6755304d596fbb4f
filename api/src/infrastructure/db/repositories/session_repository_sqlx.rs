use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::application::ports::session_repository::{SessionRepository, SessionRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxSessionRepository {
    pub pool: PgPool,
}

impl SqlxSessionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SessionRepository for SqlxSessionRepository {
    async fn upsert_session(
        &self,
        user_id: i64,
        token: &str,
        created_at: DateTime<Utc>,
        expire_at: DateTime<Utc>,
    ) -> anyhow::Result<()> {
        sqlx::query(
            r#"INSERT INTO sessions (token, created_at, expire_at, user_id)
               VALUES ($1, $2, $3, $4)
               ON CONFLICT (user_id) DO UPDATE
               SET token = EXCLUDED.token,
                   created_at = EXCLUDED.created_at,
                   expire_at = EXCLUDED.expire_at"#,
        )
        .bind(token)
        .bind(created_at)
        .bind(expire_at)
        .bind(user_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn find_by_token(&self, token: &str) -> anyhow::Result<Option<SessionRow>> {
        let row = sqlx::query(
            r#"SELECT token_id, user_id, created_at, expire_at FROM sessions WHERE token = $1"#,
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| SessionRow {
            token_id: r.get("token_id"),
            user_id: r.get("user_id"),
            created_at: r.get("created_at"),
            expire_at: r.get("expire_at"),
        }))
    }

    async fn delete_for_user(&self, user_id: i64) -> anyhow::Result<bool> {
        let res = sqlx::query("DELETE FROM sessions WHERE user_id = $1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok(res.rows_affected() > 0)
    }
}
