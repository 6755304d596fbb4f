use async_trait::async_trait;

/// Read-only username -> user id lookup.
#[async_trait]
pub trait IdentityResolver: Send + Sync {
    async fn resolve_username(&self, username: &str) -> anyhow::Result<Option<i64>>;
}
