//! Generic TTL store backing the analysis cache.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard, PoisonError};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::time::{Duration, Instant};

use super::{CacheConfig, CacheError};
use crate::metrics;

/// Cache statistics, maintained incrementally.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub size: usize,
    pub max_entries: usize,
    pub eviction_count: u64,
    /// Creation time of the oldest live entry.
    pub oldest_entry: Option<DateTime<Utc>>,
    /// Creation time of the newest live entry.
    pub newest_entry: Option<DateTime<Utc>>,
}

impl CacheStats {
    /// Fraction of lookups that hit, 0 when nothing was looked up.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

#[derive(Debug)]
struct Entry<V> {
    value: V,
    created_at: Instant,
    created_wall: DateTime<Utc>,
    expires_at: Instant,
    hits: u64,
    /// Position in creation order.
    seq: u64,
}

#[derive(Debug)]
struct Inner<V> {
    entries: HashMap<String, Entry<V>>,
    /// Creation sequence -> key, oldest first.
    creation_order: BTreeMap<u64, String>,
    next_seq: u64,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<V> Inner<V> {
    fn remove(&mut self, key: &str) -> Option<Entry<V>> {
        let entry = self.entries.remove(key)?;
        self.creation_order.remove(&entry.seq);
        Some(entry)
    }

    fn evict(&mut self, key: &str, reason: &str) {
        if self.remove(key).is_some() {
            self.evictions += 1;
            metrics::CACHE_EVICTIONS.with_label_values(&[reason]).inc();
        }
    }
}

/// Reason an entry is no longer servable, if any.
fn stale_reason<V>(entry: &Entry<V>, now: Instant, max_age: Duration) -> Option<&'static str> {
    if now >= entry.expires_at {
        Some("expired")
    } else if now.saturating_duration_since(entry.created_at) >= max_age {
        Some("max_age")
    } else {
        None
    }
}

/// TTL + max-age cache with a hard entry cap.
///
/// When the cap is exceeded the oldest-created entry goes first. Reads do not
/// affect eviction order; overwriting a key counts as a new creation.
/// Every operation is a single critical section on a std mutex.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Mutex<Inner<V>>,
    max_entries: usize,
    max_age: Duration,
}

impl<V: Clone> TtlCache<V> {
    /// Create a cache holding at most `max_entries` entries (minimum 1).
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                creation_order: BTreeMap::new(),
                next_seq: 0,
                hits: 0,
                misses: 0,
                evictions: 0,
            }),
            max_entries: max_entries.max(1),
            max_age,
        }
    }

    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, Duration::from_secs(config.max_age_secs))
    }

    /// Cached value, or `None` on a miss.
    ///
    /// An expired or over-age entry is removed and reported as a miss.
    pub fn get(&self, key: &str) -> Result<Option<V>, CacheError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| CacheError::retrieval(format!("cache lock poisoned: {}", e)))?;
        let now = Instant::now();

        let state = inner
            .entries
            .get(key)
            .map(|entry| stale_reason(entry, now, self.max_age));

        let Some(stale) = state else {
            inner.misses += 1;
            metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
            return Ok(None);
        };

        if let Some(reason) = stale {
            inner.evict(key, reason);
            inner.misses += 1;
            metrics::CACHE_LOOKUPS.with_label_values(&["miss"]).inc();
            return Ok(None);
        }

        inner.hits += 1;
        metrics::CACHE_LOOKUPS.with_label_values(&["hit"]).inc();
        let entry = inner
            .entries
            .get_mut(key)
            .ok_or_else(|| CacheError::retrieval(format!("entry '{}' vanished", key)))?;
        entry.hits += 1;
        Ok(Some(entry.value.clone()))
    }

    /// Store `value` under `key`, expiring `ttl` from now.
    pub fn set(&self, key: &str, value: V, ttl: Duration) -> Result<(), CacheError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| CacheError::storage(format!("cache lock poisoned: {}", e)))?;
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            CacheError::storage(format!("ttl of {}s for '{}' is out of range", ttl.as_secs(), key))
        })?;

        inner.remove(key);

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.creation_order.insert(seq, key.to_string());
        inner.entries.insert(
            key.to_string(),
            Entry {
                value,
                created_at: now,
                created_wall: Utc::now(),
                expires_at,
                hits: 0,
                seq,
            },
        );

        while inner.entries.len() > self.max_entries {
            let Some((_, oldest)) = inner.creation_order.first_key_value() else {
                break;
            };
            let oldest = oldest.clone();
            inner.evict(&oldest, "capacity");
        }

        Ok(())
    }

    /// Remove one entry. Returns whether it existed.
    pub fn invalidate(&self, key: &str) -> Result<bool, CacheError> {
        let mut inner = self.lock_for_invalidation()?;
        Ok(inner.remove(key).is_some())
    }

    /// Remove every entry whose key starts with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        let mut inner = self.lock_for_invalidation()?;
        let keys: Vec<String> = inner
            .entries
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect();
        for key in &keys {
            inner.remove(key);
        }
        Ok(keys.len())
    }

    /// Remove every entry. Counters are kept.
    pub fn clear(&self) -> Result<usize, CacheError> {
        let mut inner = self.lock_for_invalidation()?;
        let removed = inner.entries.len();
        inner.entries.clear();
        inner.creation_order.clear();
        Ok(removed)
    }

    /// Drop expired and over-age entries. Returns how many were dropped.
    pub fn purge_expired(&self) -> Result<usize, CacheError> {
        let mut inner = self.lock_for_invalidation()?;
        let now = Instant::now();

        let stale: Vec<(String, &'static str)> = inner
            .entries
            .iter()
            .filter_map(|(k, e)| stale_reason(e, now, self.max_age).map(|r| (k.clone(), r)))
            .collect();

        for (key, reason) in &stale {
            inner.evict(key, reason);
        }
        Ok(stale.len())
    }

    /// Times `key` was served since it was stored.
    pub fn entry_hits(&self, key: &str) -> Option<u64> {
        self.lock_for_read().entries.get(key).map(|e| e.hits)
    }

    pub fn len(&self) -> usize {
        self.lock_for_read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn stats(&self) -> CacheStats {
        let inner = self.lock_for_read();
        let created_at = |seq: Option<(&u64, &String)>| {
            seq.and_then(|(_, key)| inner.entries.get(key))
                .map(|e| e.created_wall)
        };

        CacheStats {
            hits: inner.hits,
            misses: inner.misses,
            size: inner.entries.len(),
            max_entries: self.max_entries,
            eviction_count: inner.evictions,
            oldest_entry: created_at(inner.creation_order.first_key_value()),
            newest_entry: created_at(inner.creation_order.last_key_value()),
        }
    }

    fn lock_for_invalidation(&self) -> Result<MutexGuard<'_, Inner<V>>, CacheError> {
        self.inner
            .lock()
            .map_err(|e| CacheError::invalidation(format!("cache lock poisoned: {}", e)))
    }

    fn lock_for_read(&self) -> MutexGuard<'_, Inner<V>> {
        // Counters and sizes stay meaningful after a poisoning panic.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
