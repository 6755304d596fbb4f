use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString},
};
use password_hash::rand_core::OsRng;
use tracing::info;

use crate::application::ports::user_repository::UserRepository;
use crate::domain::users::credentials::credentials_are_valid;
use crate::domain::users::{AuthError, User};

/// Admin-gated account creation.
pub struct Register<'a, R: UserRepository + ?Sized> {
    pub repo: &'a R,
    pub admin_token: &'a str,
}

#[derive(Debug, Clone)]
pub struct RegisterRequest {
    pub login: String,
    pub password: String,
    pub token: String,
}

impl<'a, R: UserRepository + ?Sized> Register<'a, R> {
    pub async fn execute(&self, req: &RegisterRequest) -> Result<User, AuthError> {
        if self.admin_token.is_empty() || req.token != self.admin_token {
            return Err(AuthError::InvalidToken);
        }
        if !credentials_are_valid(&req.login, &req.password) {
            return Err(AuthError::InvalidData(
                "login or password does not meet requirements".into(),
            ));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = Argon2::default()
            .hash_password(req.password.as_bytes(), &salt)
            .map_err(|e| AuthError::Backend(anyhow::anyhow!(e.to_string())))?
            .to_string();
        let row = self
            .repo
            .create_user(&req.login, &hash)
            .await
            .map_err(AuthError::Backend)?
            .ok_or(AuthError::UsernameTaken)?;
        info!(user_id = row.id, "user_registered");
        Ok(User {
            id: row.id,
            username: row.username,
        })
    }
}
