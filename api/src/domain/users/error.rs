use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("invalid data")]
    InvalidCredentials,
    #[error("invalid token")]
    InvalidToken,
    #[error("invalid data: {0}")]
    InvalidData(String),
    #[error("username exists")]
    UsernameTaken,
    #[error("something went wrong")]
    Backend(#[source] anyhow::Error),
}
