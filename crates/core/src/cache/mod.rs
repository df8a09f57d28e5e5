//! Analysis cache.
//!
//! Time-boxed key-value cache for derived artifacts (podcast feature
//! analyses, directory search pages, completion output). Entries expire after
//! their TTL, are dropped once older than `max_age` regardless of TTL, and the
//! entry count is capped with oldest-created-first eviction.
//!
//! Cache failures are typed ([`CacheError`]) but callers on the matching path
//! go through the degrading helpers of [`AnalysisCache`], which log the error
//! and behave as a miss.

mod analysis;
pub mod keys;
mod store;

pub use analysis::{AnalysisCache, CachedValue};
pub use store::{CacheStats, TtlCache};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Cache configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of live entries.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,
    /// TTL applied when the caller does not pass one.
    #[serde(default = "default_ttl_secs")]
    pub default_ttl_secs: u64,
    /// Hard staleness bound, applied on top of the TTL.
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
    /// Background purge interval. 0 disables the purge task.
    #[serde(default = "default_purge_interval_secs")]
    pub purge_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: default_max_entries(),
            default_ttl_secs: default_ttl_secs(),
            max_age_secs: default_max_age_secs(),
            purge_interval_secs: default_purge_interval_secs(),
        }
    }
}

fn default_max_entries() -> usize {
    1000
}

fn default_ttl_secs() -> u64 {
    3600
}

fn default_max_age_secs() -> u64 {
    86400
}

fn default_purge_interval_secs() -> u64 {
    300
}

/// Which cache operation failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CacheErrorKind {
    StorageError,
    RetrievalError,
    InvalidationError,
}

impl CacheErrorKind {
    /// Metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            CacheErrorKind::StorageError => "storage",
            CacheErrorKind::RetrievalError => "retrieval",
            CacheErrorKind::InvalidationError => "invalidation",
        }
    }
}

impl fmt::Display for CacheErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CacheErrorKind::StorageError => write!(f, "STORAGE_ERROR"),
            CacheErrorKind::RetrievalError => write!(f, "RETRIEVAL_ERROR"),
            CacheErrorKind::InvalidationError => write!(f, "INVALIDATION_ERROR"),
        }
    }
}

/// A failed cache operation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{kind}: {message}")]
pub struct CacheError {
    pub kind: CacheErrorKind,
    pub message: String,
}

impl CacheError {
    pub fn storage(message: impl Into<String>) -> Self {
        Self {
            kind: CacheErrorKind::StorageError,
            message: message.into(),
        }
    }

    pub fn retrieval(message: impl Into<String>) -> Self {
        Self {
            kind: CacheErrorKind::RetrievalError,
            message: message.into(),
        }
    }

    pub fn invalidation(message: impl Into<String>) -> Self {
        Self {
            kind: CacheErrorKind::InvalidationError,
            message: message.into(),
        }
    }
}
