//! Process-local document cache with per-entry TTL.
//!
//! One `RwLock<HashMap>` guards every entry. Reads take the shared lock;
//! writes, deletes and sweeps take the exclusive one. Expired entries read
//! as absent and are physically removed by `sweep_expired`.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};

use crate::application::ports::document_cache::{CacheKey, CachedPayload, DocumentCache};

// Fallback lifetime when `now + ttl` is not representable.
const FAR_FUTURE: Duration = Duration::from_secs(30 * 365 * 24 * 60 * 60);

#[derive(Debug, Clone)]
struct CacheEntry {
    payload: CachedPayload,
    expires_at: Instant,
}

impl CacheEntry {
    fn new(payload: CachedPayload, ttl: Duration) -> Self {
        let now = Instant::now();
        let expires_at = now
            .checked_add(ttl)
            .or_else(|| now.checked_add(FAR_FUTURE))
            .unwrap_or(now);
        Self {
            payload,
            expires_at,
        }
    }

    fn is_expired(&self, now: Instant) -> bool {
        now >= self.expires_at
    }
}

#[derive(Debug, Default)]
pub struct MemoryDocumentCache {
    entries: RwLock<HashMap<CacheKey, CacheEntry>>,
}

impl MemoryDocumentCache {
    pub fn new() -> Self {
        Self::default()
    }
}

// A panic while holding the lock leaves the map intact, so poisoning is ignored.
impl DocumentCache for MemoryDocumentCache {
    fn get(&self, key: &CacheKey) -> Option<CachedPayload> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some(entry) if !entry.is_expired(Instant::now()) => Some(entry.payload.clone()),
            _ => None,
        }
    }

    fn set(&self, key: CacheKey, payload: CachedPayload, ttl: Duration) {
        let entry = CacheEntry::new(payload, ttl);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    fn delete(&self, key: &CacheKey) {
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key);
    }

    fn sweep_expired(&self) -> usize {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_expired(now));
        before - entries.len()
    }

    fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
