use std::fmt;
use std::time::Duration;

use serde_json::Value;
use uuid::Uuid;

/// Cache key: the document plus the user who read it. Visibility is decided
/// per requester, so two users never share an entry for the same document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub document_id: Uuid,
    pub user_id: i64,
}

impl CacheKey {
    pub fn new(document_id: Uuid, user_id: i64) -> Self {
        Self {
            document_id,
            user_id,
        }
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc_{}_{}", self.document_id, self.user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CachedPayload {
    Binary { bytes: Vec<u8>, mime: String },
    Json(Vec<u8>),
}

#[derive(thiserror::Error, Debug)]
pub enum CacheError {
    #[error("cache serialization failed")]
    Serialization(#[source] serde_json::Error),
}

/// Process-local document cache. Implementations must never block on I/O
/// while holding their lock; none of these calls suspend.
pub trait DocumentCache: Send + Sync {
    /// Expired entries read as absent.
    fn get(&self, key: &CacheKey) -> Option<CachedPayload>;
    fn set(&self, key: CacheKey, payload: CachedPayload, ttl: Duration);
    fn delete(&self, key: &CacheKey);
    /// Drops every expired entry and returns how many were removed.
    fn sweep_expired(&self) -> usize;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn get_binary(&self, key: &CacheKey) -> Option<(Vec<u8>, String)> {
        match self.get(key) {
            Some(CachedPayload::Binary { bytes, mime }) => Some((bytes, mime)),
            _ => None,
        }
    }

    fn set_binary(&self, key: CacheKey, bytes: Vec<u8>, mime: String, ttl: Duration) {
        self.set(key, CachedPayload::Binary { bytes, mime }, ttl);
    }

    fn get_json(&self, key: &CacheKey) -> Result<Option<Value>, CacheError> {
        match self.get(key) {
            Some(CachedPayload::Json(raw)) => serde_json::from_slice(&raw)
                .map(Some)
                .map_err(CacheError::Serialization),
            _ => Ok(None),
        }
    }

    fn set_json(&self, key: CacheKey, value: &Value, ttl: Duration) -> Result<(), CacheError> {
        let raw = serde_json::to_vec(value).map_err(CacheError::Serialization)?;
        self.set(key, CachedPayload::Json(raw), ttl);
        Ok(())
    }
}
