use async_trait::async_trait;
use sqlx::{PgExecutor, Row};

use crate::application::ports::identity_resolver::IdentityResolver;
use crate::application::ports::user_repository::{UserRepository, UserRow};
use crate::infrastructure::db::PgPool;

pub struct SqlxUserRepository {
    pub pool: PgPool,
}

impl SqlxUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// Ids of the usernames that exist; unknown names are skipped. Usable on the
/// pool or inside a transaction.
pub(crate) async fn resolve_user_ids<'e, E>(
    exec: E,
    usernames: &[String],
) -> Result<Vec<i64>, sqlx::Error>
where
    E: PgExecutor<'e>,
{
    sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = ANY($1)")
        .bind(usernames)
        .fetch_all(exec)
        .await
}

#[async_trait]
impl UserRepository for SqlxUserRepository {
    async fn create_user(
        &self,
        username: &str,
        pass_hash: &str,
    ) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(
            r#"INSERT INTO users (username, pass_hash) VALUES ($1, $2)
               ON CONFLICT (username) DO NOTHING
               RETURNING id, username"#,
        )
        .bind(username)
        .bind(pass_hash)
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(|r| UserRow {
            id: r.get("id"),
            username: r.get("username"),
            pass_hash: None,
        }))
    }

    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>> {
        let row = sqlx::query(r#"SELECT id, username, pass_hash FROM users WHERE username = $1"#)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.map(|r| UserRow {
            id: r.get("id"),
            username: r.get("username"),
            pass_hash: r.try_get("pass_hash").ok(),
        }))
    }
}

#[async_trait]
impl IdentityResolver for SqlxUserRepository {
    async fn resolve_username(&self, username: &str) -> anyhow::Result<Option<i64>> {
        let id = sqlx::query_scalar::<_, i64>("SELECT id FROM users WHERE username = $1")
            .bind(username)
            .fetch_optional(&self.pool)
            .await?;
        Ok(id)
    }
}
