use async_trait::async_trait;

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub username: String,
    pub pass_hash: Option<String>,
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    // None when the username is already taken
    async fn create_user(&self, username: &str, pass_hash: &str)
    -> anyhow::Result<Option<UserRow>>;
    async fn find_by_username(&self, username: &str) -> anyhow::Result<Option<UserRow>>;
}
