//! Debounced, cancelable, cached tag search.
//!
//! One service instance runs at most one pending search; a newer call fully
//! supersedes the older (the older resolves with the empty result, and an
//! already-sent request is aborted by dropping its future). Cancellation is
//! not an error: an empty result is indistinguishable from "no matches
//! yet", which is what a superseded keystroke should look like.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use super::cache::QueryCache;
use crate::client::{ApiError, PointCatalog};
use crate::config::SearchConfig;
use crate::core::Tag;

/// Search tunables, decoupled from the config file schema.
#[derive(Clone, Debug)]
pub struct TagSearchOptions {
    pub min_chars: usize,
    pub debounce: Duration,
    pub limit: usize,
    pub cache_ttl: Duration,
    pub cache_enabled: bool,
}

impl Default for TagSearchOptions {
    fn default() -> Self {
        Self {
            min_chars: 2,
            debounce: Duration::from_millis(120),
            limit: 50,
            cache_ttl: Duration::from_secs(60),
            cache_enabled: true,
        }
    }
}

impl From<&SearchConfig> for TagSearchOptions {
    fn from(config: &SearchConfig) -> Self {
        Self {
            min_chars: config.min_chars,
            debounce: Duration::from_millis(config.debounce_ms),
            limit: config.limit,
            cache_ttl: Duration::from_millis(config.cache_ttl_ms),
            cache_enabled: config.cache_enabled,
        }
    }
}

/// One resolved search.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TagSearchResult {
    pub tags: Vec<Tag>,
    pub has_more: bool,
    pub total: Option<usize>,
}

impl TagSearchResult {
    pub fn empty() -> Self {
        Self::default()
    }
}

struct ActiveSearch {
    generation: u64,
    cancel: Option<watch::Sender<bool>>,
}

/// The search engine, independent of any UI.
pub struct TagSearchService<C> {
    catalog: Arc<C>,
    options: TagSearchOptions,
    cache: Mutex<QueryCache>,
    active: Mutex<ActiveSearch>,
}

impl<C: PointCatalog> TagSearchService<C> {
    pub fn new(catalog: Arc<C>, options: TagSearchOptions) -> Self {
        let ttl = options.cache_ttl;
        Self {
            catalog,
            options,
            cache: Mutex::new(QueryCache::new(ttl)),
            active: Mutex::new(ActiveSearch {
                generation: 0,
                cancel: None,
            }),
        }
    }

    pub fn options(&self) -> &TagSearchOptions {
        &self.options
    }

    /// Search the point catalog for `query`.
    ///
    /// - Below `min_chars`: resolves empty immediately, no debounce, no call.
    /// - Cache hit: resolves immediately with the cached result.
    /// - Cache miss: waits out the debounce window, then issues one catalog
    ///   call requesting `limit + 1` items to derive `has_more`.
    /// - Superseded or cancelled at any point: resolves empty.
    /// - Any error other than cancellation propagates.
    pub async fn search(&self, query: &str) -> Result<TagSearchResult, ApiError> {
        let trimmed = query.trim();

        // Newest call wins: supersede whatever is pending.
        let (generation, mut cancelled) = {
            let mut active = self.active.lock().expect("active search lock");
            if let Some(prev) = active.cancel.take() {
                let _ = prev.send(true);
            }
            active.generation += 1;
            let (tx, rx) = watch::channel(false);
            active.cancel = Some(tx);
            (active.generation, rx)
        };

        if trimmed.chars().count() < self.options.min_chars {
            self.finish(generation);
            return Ok(TagSearchResult::empty());
        }

        if self.options.cache_enabled {
            let mut cache = self.cache.lock().expect("search cache lock");
            if let Some(hit) = cache.get(trimmed) {
                drop(cache);
                self.finish(generation);
                return Ok(hit);
            }
        }

        // Debounce window; a cancel during it means a newer keystroke won.
        tokio::select! {
            _ = tokio::time::sleep(self.options.debounce) => {}
            _ = wait_cancelled(&mut cancelled) => return Ok(TagSearchResult::empty()),
        }

        // The losing branch is dropped, which aborts an in-flight request;
        // its eventual result is never applied anywhere.
        let fetched = tokio::select! {
            result = self.catalog.search_by_name(trimmed, self.options.limit + 1) => result,
            _ = wait_cancelled(&mut cancelled) => return Ok(TagSearchResult::empty()),
        };

        self.finish(generation);
        let page = fetched?;

        let mut tags = page.tags;
        let has_more = tags.len() > self.options.limit;
        tags.truncate(self.options.limit);
        let result = TagSearchResult {
            tags,
            has_more,
            total: page.total,
        };

        if self.options.cache_enabled {
            self.cache
                .lock()
                .expect("search cache lock")
                .insert(trimmed, result.clone());
        }
        Ok(result)
    }

    /// Cancel the pending search, if any. Idempotent.
    pub fn cancel(&self) {
        let mut active = self.active.lock().expect("active search lock");
        if let Some(cancel) = active.cancel.take() {
            let _ = cancel.send(true);
        }
    }

    /// Drop pending work and cached results. For lifecycle boundaries and
    /// test isolation.
    pub fn reset(&self) {
        self.cancel();
        self.cache.lock().expect("search cache lock").clear();
    }

    /// Clear the cancel handle if it still belongs to this call.
    fn finish(&self, generation: u64) {
        let mut active = self.active.lock().expect("active search lock");
        if active.generation == generation {
            active.cancel = None;
        }
    }
}

/// Resolve when the cancel signal fires. A dropped sender without a cancel
/// cannot happen for the current generation, but treat it as "never" rather
/// than a spurious cancel.
async fn wait_cancelled(rx: &mut watch::Receiver<bool>) {
    if rx.wait_for(|cancelled| *cancelled).await.is_err() {
        std::future::pending::<()>().await;
    }
}
