pub mod credentials;
pub mod error;

pub use error::AuthError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: i64,
    pub username: String,
}
