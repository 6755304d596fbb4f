use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DocumentError {
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
    #[error("document not found")]
    NotFound,
    #[error("you cannot delete this document")]
    Forbidden,
    #[error("document already exists")]
    ConstraintViolation,
    #[error("backend unavailable: {0}")]
    BackendUnavailable(String),
    #[error("create failed: {0}")]
    CreateFailed(String),
    #[error("internal failure: {0}")]
    Internal(String),
    #[error("backing store call timed out")]
    Timeout,
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("unsupported media type: {0}")]
    UnsupportedMediaType(String),
}
