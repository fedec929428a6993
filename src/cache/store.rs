//! TTL cache storage.
//!
//! One process-wide store holds every cached value, type-erased, keyed by a
//! namespaced [`CacheKey`]. Entries expire lazily: nothing sweeps in the
//! background, an expired entry is removed by the first read that finds it.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Duration;

use metrics::counter;
use serde::Serialize;
use time::OffsetDateTime;
use tracing::{debug, warn};

use super::clock::{Clock, SystemClock};
use super::keys::CacheKey;


pub(crate) const METRIC_CACHE_HIT: &str = "folio_cache_hit_total";
pub(crate) const METRIC_CACHE_MISS: &str = "folio_cache_miss_total";
pub(crate) const METRIC_CACHE_EXPIRED: &str = "folio_cache_expired_total";
pub(crate) const METRIC_CACHE_FETCH_ERROR: &str = "folio_cache_fetch_error_total";

struct CachedEntry {
    data: Box<dyn Any + Send + Sync>,
    stored_at: OffsetDateTime,
    ttl: Duration,
}

impl CachedEntry {
    fn is_expired(&self, now: OffsetDateTime) -> bool {
        now - self.stored_at > self.ttl
    }
}

/// Point-in-time counters for the admin surface.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Entries currently held, expired or not.
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    /// Entries removed because a read found them expired.
    pub evictions: u64,
}

/// Namespaced key/value store with per-entry expiry.
pub struct TtlCache {
    entries: RwLock<HashMap<CacheKey, CachedEntry>>,
    clock: Arc<dyn Clock>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }

    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            clock,
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the value stored under `key` if it is present, unexpired and of type `T`.
    pub fn get<T>(&self, key: &CacheKey) -> Option<T>
    where
        T: Clone + Send + Sync + 'static,
    {
        let now = self.clock.now();

        {
            let entries = self.read_entries("get");
            match entries.get(key) {
                None => {
                    self.record_miss(key);
                    return None;
                }
                Some(entry) if !entry.is_expired(now) => {
                    return match entry.data.downcast_ref::<T>() {
                        Some(value) => {
                            self.record_hit(key);
                            Some(value.clone())
                        }
                        None => {
                            warn!(
                                target = "folio::cache",
                                key = %key,
                                expected = std::any::type_name::<T>(),
                                "Cached value has a different type; treating as miss"
                            );
                            self.record_miss(key);
                            None
                        }
                    };
                }
                Some(_) => {}
            }
        }

        let mut entries = self.write_entries("get.evict");
        if entries.get(key).is_some_and(|entry| entry.is_expired(now)) {
            entries.remove(key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
            counter!(METRIC_CACHE_EXPIRED, "namespace" => key.namespace().to_owned()).increment(1);
            debug!(target = "folio::cache", key = %key, "Evicted expired entry");
        }
        drop(entries);

        self.record_miss(key);
        None
    }

    /// Store `value` under `key`, replacing any existing entry and restarting its TTL.
    pub fn set<T>(&self, key: CacheKey, value: T, ttl: Duration)
    where
        T: Send + Sync + 'static,
    {
        let entry = CachedEntry {
            data: Box::new(value),
            stored_at: self.clock.now(),
            ttl,
        };
        self.write_entries("set").insert(key, entry);
    }

    /// Remove each listed key; absent keys are ignored.
    pub fn invalidate(&self, keys: &[CacheKey]) {
        let mut entries = self.write_entries("invalidate");
        for key in keys {
            entries.remove(key);
        }
    }

    /// Drop every entry, or only those whose key contains `pattern` as a substring.
    ///
    /// Returns the number of removed entries.
    pub fn clear(&self, pattern: Option<&str>) -> usize {
        let mut entries = self.write_entries("clear");
        let before = entries.len();
        match pattern {
            None => entries.clear(),
            Some(pattern) => entries.retain(|key, _| !key.as_str().contains(pattern)),
        }
        before - entries.len()
    }

    /// Return the cached value for `key`, or run `fetcher` and cache its success.
    ///
    /// A fresh entry short-circuits the fetcher entirely. Fetch failures are
    /// returned to the caller and leave the cache untouched.
    pub async fn get_cached_data<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetcher: F,
    ) -> Result<T, E>
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        if let Some(value) = self.get::<T>(key) {
            return Ok(value);
        }

        match fetcher().await {
            Ok(value) => {
                self.set(key.clone(), value.clone(), ttl);
                Ok(value)
            }
            Err(err) => {
                counter!(METRIC_CACHE_FETCH_ERROR, "namespace" => key.namespace().to_owned())
                    .increment(1);
                warn!(
                    target = "folio::cache",
                    key = %key,
                    error = %err,
                    "Fetch failed; nothing cached"
                );
                Err(err)
            }
        }
    }

    /// Like [`TtlCache::get_cached_data`], but answers `fallback` (uncached) on fetch failure.
    pub async fn get_cached_data_or<T, E, F, Fut>(
        &self,
        key: &CacheKey,
        ttl: Duration,
        fetcher: F,
        fallback: T,
    ) -> T
    where
        T: Clone + Send + Sync + 'static,
        E: fmt::Display,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        match self.get_cached_data(key, ttl, fetcher).await {
            Ok(value) => value,
            Err(_) => fallback,
        }
    }

    /// Snapshot of the keys currently held, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.read_entries("keys")
            .keys()
            .map(|key| key.as_str().to_owned())
            .collect();
        keys.sort();
        keys
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.len(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
        }
    }

    pub fn len(&self) -> usize {
        self.read_entries("len").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries are replaced whole, so a panic under the lock cannot leave a
    /// half-written value behind; poisoning is logged and cleared.
    fn recover<G>(&self, op: &'static str, poisoned: PoisonError<G>) -> G {
        warn!(
            target = "folio::cache",
            op,
            result = "poisoned_recovered",
            "Recovered from poisoned entry map"
        );
        self.entries.clear_poison();
        poisoned.into_inner()
    }

    fn read_entries(
        &self,
        op: &'static str,
    ) -> RwLockReadGuard<'_, HashMap<CacheKey, CachedEntry>> {
        self.entries
            .read()
            .unwrap_or_else(|poisoned| self.recover(op, poisoned))
    }

    fn write_entries(
        &self,
        op: &'static str,
    ) -> RwLockWriteGuard<'_, HashMap<CacheKey, CachedEntry>> {
        self.entries
            .write()
            .unwrap_or_else(|poisoned| self.recover(op, poisoned))
    }

    fn record_hit(&self, key: &CacheKey) {
        self.hits.fetch_add(1, Ordering::Relaxed);
        counter!(METRIC_CACHE_HIT, "namespace" => key.namespace().to_owned()).increment(1);
    }

    fn record_miss(&self, key: &CacheKey) {
        self.misses.fetch_add(1, Ordering::Relaxed);
        counter!(METRIC_CACHE_MISS, "namespace" => key.namespace().to_owned()).increment(1);
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}
