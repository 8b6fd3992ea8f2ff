//! Cache-aside storage orchestration for tweets and users.
//!
//! Orchestrators sit between the services and the DAOs. Every entity they
//! return is fully hydrated (author, counters, viewer flags), whichever mix of
//! cache and store it was assembled from. Collections are hydrated on a
//! per-call [`WorkerPool`](chirp_core::WorkerPool).
//!
//! Failures reaching the caller are either [`ChirpError::NotFound`] or the
//! opaque [`ChirpError::Unexpected`]; the cause is logged where it occurred.
//! Cache reads that fail are treated as misses and cache writes that fail after
//! a committed DAO write are logged and dropped.

pub mod r#impl;
pub mod tweet_storage;
pub mod user_storage;

pub use r#impl::*;
pub use tweet_storage::TweetStorage;
pub use user_storage::UserStorage;

use crate::cache::{decode, CacheAccessor, CacheAccessorExt, CacheEntry, CacheKey};
use chirp_config::CacheConfig;
use chirp_core::worker_pool::DEFAULT_WORKERS;
use chirp_core::{ChirpError, ChirpResult};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashSet;
use std::hash::Hash;
use std::time::Duration;
use tracing::{error, warn};

/// Default TTL for identity entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

/// Default TTL for search result ID lists (1 minute).
pub const DEFAULT_SEARCH_TTL: Duration = Duration::from_secs(60);

/// Cache policy and fan-out shared by both orchestrators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StorageSettings {
    /// TTL of tweet and user identity entries.
    pub ttl: Duration,
    /// TTL of cached search results.
    pub search_ttl: Duration,
    /// Workers per hydration pool.
    pub workers: usize,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            ttl: DEFAULT_TTL,
            search_ttl: DEFAULT_SEARCH_TTL,
            workers: DEFAULT_WORKERS,
        }
    }
}

impl From<&CacheConfig> for StorageSettings {
    fn from(config: &CacheConfig) -> Self {
        Self {
            ttl: config.ttl(),
            search_ttl: config.search_ttl(),
            workers: config.worker_pool_size,
        }
    }
}

/// Direction of a transition-only counter update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Delta {
    Up,
    Down,
}

/// Collapses a DAO or cache failure into the upward error taxonomy.
///
/// Absence and uniqueness conflicts pass through; everything else is logged
/// and becomes [`ChirpError::Unexpected`].
pub(crate) fn storage_error(op: &'static str, err: ChirpError) -> ChirpError {
    match err {
        ChirpError::NotFound { .. } | ChirpError::Conflict(_) => err,
        other => {
            error!(op, error = %other, "Storage operation failed");
            ChirpError::Unexpected
        }
    }
}

/// Turns a failed cache read into a miss.
pub(crate) fn cached<T>(op: &'static str, result: ChirpResult<Option<T>>) -> Option<T> {
    result.unwrap_or_else(|e| {
        warn!(op, error = %e, "Cache read failed, falling back to store");
        None
    })
}

/// Turns a failed positional batch read into all misses.
pub(crate) fn cached_batch(
    op: &'static str,
    len: usize,
    result: ChirpResult<Vec<Option<String>>>,
) -> Vec<Option<String>> {
    match result {
        Ok(values) if values.len() == len => values,
        Ok(values) => {
            warn!(op, expected = len, got = values.len(), "Cache batch size mismatch");
            vec![None; len]
        }
        Err(e) => {
            warn!(op, error = %e, "Cache read failed, falling back to store");
            vec![None; len]
        }
    }
}

/// Decodes one slot of a raw batch read; an undecodable value is a miss.
pub(crate) fn decoded<V: DeserializeOwned>(op: &'static str, raw: Option<&str>) -> Option<V> {
    let raw = raw?;
    match decode(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(op, error = %e, "Undecodable cache value, treating as miss");
            None
        }
    }
}

/// Logs a failed cache write. The store already holds the truth.
pub(crate) fn log_write<T>(op: &'static str, result: ChirpResult<T>) {
    if let Err(e) = result {
        warn!(op, error = %e, "Cache write failed, entry may be stale until next miss");
    }
}

/// Encodes a cache entry, collapsing codec failures like any other.
pub(crate) fn entry<V: Serialize + ?Sized>(key: CacheKey, value: &V) -> ChirpResult<CacheEntry> {
    CacheEntry::new(key, value).map_err(|e| storage_error("encode", e))
}

/// Collects per-item results of a fan-out, skipping items that no longer exist.
pub(crate) fn collect_found<T>(results: Vec<ChirpResult<T>>) -> ChirpResult<Vec<T>> {
    let mut found = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(item) => found.push(item),
            Err(e) if e.is_not_found() => {}
            Err(e) => return Err(e),
        }
    }
    Ok(found)
}

/// Drops repeated IDs, keeping the first occurrence.
pub(crate) fn distinct<T: Copy + Eq + Hash>(ids: &[T]) -> Vec<T> {
    let mut seen = HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}

/// Applies a transition to a cached counter, leaving cold counters alone.
///
/// A missing counter would be seeded at ±1 by the backend, so it is skipped and
/// re-derived from the store on the next read. A decrement that still goes
/// negative means the counter drifted; it is dropped for the same reason.
pub(crate) async fn adjust_counter(cache: &dyn CacheAccessor, key: CacheKey, delta: Delta) {
    match cache.exists(&key).await {
        Ok(true) => {}
        Ok(false) => return,
        Err(e) => {
            warn!(key = %key, error = %e, "Counter probe failed, skipping update");
            return;
        }
    }

    let keys = std::slice::from_ref(&key);
    let result = match delta {
        Delta::Up => cache.incr(keys).await,
        Delta::Down => cache.decr(keys).await,
    };

    match result {
        Ok(values) if values.first().is_some_and(|v| *v < 0) => {
            warn!(key = %key, "Counter went negative, dropping it");
            log_write("drop_counter", cache.delete(keys).await);
        }
        Ok(_) => {}
        Err(e) => warn!(key = %key, error = %e, "Counter update failed"),
    }
}

/// Adds members to a cached set, leaving cold sets alone.
///
/// Seeding a missing set with one member would make it look complete.
pub(crate) async fn add_to_cached_set<V: Serialize + Sync>(
    cache: &dyn CacheAccessor,
    key: CacheKey,
    members: &[V],
) {
    match cache.exists(&key).await {
        Ok(true) => log_write("sadd", cache.sadd(&key, members).await),
        Ok(false) => {}
        Err(e) => warn!(key = %key, error = %e, "Set probe failed, skipping update"),
    }
}
