//! Typed analysis cache shared by the matching pipeline.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::task::JoinHandle;
use tokio::time::Duration;
use tracing::{debug, warn};

use super::store::{CacheStats, TtlCache};
use super::{CacheConfig, CacheError};
use crate::directory::SearchResponse;
use crate::matching::PodcastFeatures;
use crate::metrics;

/// Cached payload, one variant per artifact kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum CachedValue {
    Features(PodcastFeatures),
    Search(SearchResponse),
    Completion(String),
}

impl CachedValue {
    pub fn kind(&self) -> &'static str {
        match self {
            CachedValue::Features(_) => "features",
            CachedValue::Search(_) => "search",
            CachedValue::Completion(_) => "completion",
        }
    }
}

fn mismatch(key: &str, expected: &str, found: &CachedValue) -> CacheError {
    CacheError::retrieval(format!(
        "entry '{}' holds {}, expected {}",
        key,
        found.kind(),
        expected
    ))
}

/// Cache for analyses, search pages and completions.
#[derive(Debug)]
pub struct AnalysisCache {
    store: TtlCache<CachedValue>,
    default_ttl: Duration,
}

impl AnalysisCache {
    pub fn new(config: &CacheConfig) -> Self {
        Self {
            store: TtlCache::from_config(config),
            default_ttl: Duration::from_secs(config.default_ttl_secs),
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Raw lookup.
    pub fn get(&self, key: &str) -> Result<Option<CachedValue>, CacheError> {
        self.store.get(key)
    }

    /// Store `value`, using the default TTL when `ttl` is `None`.
    pub fn set(
        &self,
        key: &str,
        value: CachedValue,
        ttl: Option<Duration>,
    ) -> Result<(), CacheError> {
        self.store.set(key, value, ttl.unwrap_or(self.default_ttl))
    }

    pub fn get_features(&self, key: &str) -> Result<Option<PodcastFeatures>, CacheError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(CachedValue::Features(features)) => Ok(Some(features)),
            Some(other) => Err(mismatch(key, "features", &other)),
        }
    }

    pub fn get_search(&self, key: &str) -> Result<Option<SearchResponse>, CacheError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(CachedValue::Search(page)) => Ok(Some(page)),
            Some(other) => Err(mismatch(key, "search", &other)),
        }
    }

    pub fn get_completion(&self, key: &str) -> Result<Option<String>, CacheError> {
        match self.store.get(key)? {
            None => Ok(None),
            Some(CachedValue::Completion(text)) => Ok(Some(text)),
            Some(other) => Err(mismatch(key, "completion", &other)),
        }
    }

    /// Features for `key`; a cache error is logged and reads as a miss.
    pub fn lookup_features(&self, key: &str) -> Option<PodcastFeatures> {
        degrade(key, self.get_features(key))
    }

    /// Search page for `key`; a cache error is logged and reads as a miss.
    pub fn lookup_search(&self, key: &str) -> Option<SearchResponse> {
        degrade(key, self.get_search(key))
    }

    /// Completion text for `key`; a cache error is logged and reads as a miss.
    pub fn lookup_completion(&self, key: &str) -> Option<String> {
        degrade(key, self.get_completion(key))
    }

    /// Store without failing the caller. Returns whether the value was stored.
    pub fn store(&self, key: &str, value: CachedValue, ttl: Option<Duration>) -> bool {
        match self.set(key, value, ttl) {
            Ok(()) => true,
            Err(e) => {
                record_error(key, &e);
                false
            }
        }
    }

    pub fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        self.store.invalidate(key)
    }

    /// Drop every entry under a key prefix such as `"analysis:"`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        self.store.invalidate_prefix(prefix)
    }

    pub fn clear(&self) -> Result<usize, CacheError> {
        self.store.clear()
    }

    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        self.store.purge_expired()
    }

    pub fn stats(&self) -> CacheStats {
        self.store.stats()
    }

    /// Periodically purge expired entries until the task is aborted.
    pub fn spawn_purge_task(self: Arc<Self>, every: Duration) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(every);
            // First tick fires immediately.
            interval.tick().await;
            loop {
                interval.tick().await;
                match self.purge_expired() {
                    Ok(0) => {}
                    Ok(purged) => debug!(purged, "Purged expired cache entries"),
                    Err(e) => record_error("*", &e),
                }
            }
        })
    }
}

fn degrade<T>(key: &str, result: Result<Option<T>, CacheError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            record_error(key, &e);
            None
        }
    }
}

fn record_error(key: &str, error: &CacheError) {
    metrics::CACHE_ERRORS
        .with_label_values(&[error.kind.as_str()])
        .inc();
    warn!(key = %key, error = %error, "Cache operation failed, continuing without cache");
}
