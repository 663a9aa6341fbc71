//! Case-insensitive TTL cache for search results.

use std::collections::HashMap;
use std::time::Duration;

use tokio::time::Instant;

use super::service::TagSearchResult;

struct CacheEntry {
    stored_at: Instant,
    result: TagSearchResult,
}

/// Query -> result cache with a fixed TTL.
///
/// Keys are trimmed and lowercased. Uses tokio's `Instant` so paused-clock
/// tests control expiry. Expired entries are dropped on access and swept on
/// insert; the cache never grows past live entries plus one insert.
pub struct QueryCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&mut self, query: &str) -> Option<TagSearchResult> {
        let key = cache_key(query);
        let now = Instant::now();
        match self.entries.get(&key) {
            Some(entry) if now.duration_since(entry.stored_at) < self.ttl => {
                Some(entry.result.clone())
            }
            Some(_) => {
                self.entries.remove(&key);
                None
            }
            None => None,
        }
    }

    pub fn insert(&mut self, query: &str, result: TagSearchResult) {
        let now = Instant::now();
        self.entries
            .retain(|_, entry| now.duration_since(entry.stored_at) < self.ttl);
        self.entries.insert(
            cache_key(query),
            CacheEntry {
                stored_at: now,
                result,
            },
        );
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn cache_key(query: &str) -> String {
    query.trim().to_lowercase()
}
