//! Relation cache: decoded related records keyed by page id.

use std::collections::HashMap;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::Instant;

use crate::value::Record;

/// How long a fetched related record is served from the cache.
pub const RELATION_CACHE_TTL: Duration = Duration::from_secs(5 * 60);

#[derive(Debug)]
struct CachedRecord {
    fetched_at: Instant,
    record: Record,
}

/// Per-builder cache of related records.
///
/// Entries go stale after the TTL and are replaced on the next fetch; nothing
/// is evicted otherwise.
#[derive(Debug)]
pub(crate) struct RelationCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, CachedRecord>>,
}

impl RelationCache {
    pub(crate) fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// The cached record for `id`, unless missing or stale.
    pub(crate) async fn get(&self, id: &str) -> Option<Record> {
        let entries = self.entries.lock().await;
        let cached = entries.get(id)?;

        let age = cached.fetched_at.elapsed();
        if age < self.ttl {
            tracing::debug!(id, ?age, "Relation cache hit");
            Some(cached.record.clone())
        } else {
            tracing::debug!(id, ?age, ttl = ?self.ttl, "Relation cache entry expired");
            None
        }
    }

    /// Stores `record` under `id`, stamped now. Last write wins.
    pub(crate) async fn insert(&self, id: &str, record: Record) {
        self.entries.lock().await.insert(
            id.to_string(),
            CachedRecord {
                fetched_at: Instant::now(),
                record,
            },
        );
    }
}

impl Default for RelationCache {
    fn default() -> Self {
        Self::new(RELATION_CACHE_TTL)
    }
}
