use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::debug;

use crate::application::ports::document_cache::DocumentCache;

/// Periodically drops expired cache entries. Runs until the task is aborted.
pub fn spawn_sweeper(cache: Arc<dyn DocumentCache>, every: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // the first tick fires immediately
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = cache.sweep_expired();
            if removed > 0 {
                debug!(removed, remaining = cache.len(), "cache_swept");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::ports::document_cache::{CacheKey, CachedPayload};
    use crate::infrastructure::cache::memory_cache::MemoryDocumentCache;
    use uuid::Uuid;

    #[tokio::test]
    async fn sweeper_removes_expired_entries_and_keeps_live_ones() {
        let cache = Arc::new(MemoryDocumentCache::new());
        let live = CacheKey::new(Uuid::new_v4(), 1);
        cache.set(
            CacheKey::new(Uuid::new_v4(), 1),
            CachedPayload::Json(b"1".to_vec()),
            Duration::from_millis(5),
        );
        cache.set(live, CachedPayload::Json(b"2".to_vec()), Duration::from_secs(60));

        let handle = spawn_sweeper(cache.clone(), Duration::from_millis(20));
        for _ in 0..100 {
            if cache.len() == 1 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        handle.abort();

        assert_eq!(cache.len(), 1);
        assert!(cache.get(&live).is_some());
    }
}
