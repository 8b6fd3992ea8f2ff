//! In-process cache accessor.
//!
//! Mirrors the Redis semantics the storage layer relies on (missing counters
//! start at ±1, emptied sets disappear, type mismatches fail) behind a single
//! lock, so tests and single-node setups can run without a Redis server.

use super::{CacheAccessor, CacheEntry, CacheKey};
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
enum Value {
    Scalar(String),
    Set(HashSet<String>),
}

#[derive(Debug, Clone)]
struct Slot {
    value: Value,
    expires_at: Option<Instant>,
}

impl Slot {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |at| at > now)
    }
}

fn wrong_type(key: &str) -> ChirpError {
    ChirpError::Cache(format!(
        "WRONGTYPE operation against key '{}' holding the wrong kind of value",
        key
    ))
}

/// In-memory cache accessor with lazy TTL expiry.
#[derive(Debug, Default)]
pub struct InMemoryCacheAccessor {
    entries: Mutex<HashMap<String, Slot>>,
}

impl InMemoryCacheAccessor {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live keys.
    #[must_use]
    pub fn len(&self) -> usize {
        let now = Instant::now();
        self.entries.lock().values().filter(|s| s.is_live(now)).count()
    }

    /// Returns `true` if no live key is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the remaining TTL of a key, `None` if it has no expiry or is missing.
    #[must_use]
    pub fn ttl(&self, key: &CacheKey) -> Option<Duration> {
        let now = Instant::now();
        self.entries
            .lock()
            .get(&key.hash())
            .filter(|s| s.is_live(now))
            .and_then(|s| s.expires_at)
            .map(|at| at.saturating_duration_since(now))
    }

    /// Looks up a live slot, evicting it if it has expired.
    fn live<'a>(entries: &'a mut HashMap<String, Slot>, key: &str) -> Option<&'a mut Slot> {
        let now = Instant::now();
        if entries.get(key).is_some_and(|s| !s.is_live(now)) {
            entries.remove(key);
        }
        entries.get_mut(key)
    }

    fn step(&self, keys: &[CacheKey], delta: i64) -> ChirpResult<Vec<i64>> {
        let mut entries = self.entries.lock();
        let mut out = Vec::with_capacity(keys.len());
        for key in keys {
            let key = key.hash();
            let next = match Self::live(&mut entries, &key) {
                Some(slot) => {
                    let Value::Scalar(raw) = &slot.value else {
                        return Err(wrong_type(&key));
                    };
                    let current: i64 = raw.parse().map_err(|_| {
                        ChirpError::Cache(format!("value at '{}' is not an integer", key))
                    })?;
                    let next = current + delta;
                    slot.value = Value::Scalar(next.to_string());
                    next
                }
                None => {
                    entries.insert(
                        key,
                        Slot {
                            value: Value::Scalar(delta.to_string()),
                            expires_at: None,
                        },
                    );
                    delta
                }
            };
            out.push(next);
        }
        Ok(out)
    }
}

#[async_trait]
impl CacheAccessor for InMemoryCacheAccessor {
    fn is_enabled(&self) -> bool {
        true
    }

    async fn set_raw(&self, entries: &[CacheEntry], ttl: Option<Duration>) -> ChirpResult<()> {
        let expires_at = ttl.map(|ttl| Instant::now() + ttl);
        let mut map = self.entries.lock();
        for entry in entries {
            map.insert(
                entry.key.hash(),
                Slot {
                    value: Value::Scalar(entry.value.clone()),
                    expires_at,
                },
            );
        }
        Ok(())
    }

    async fn get_raw(&self, keys: &[CacheKey]) -> ChirpResult<Vec<Option<String>>> {
        let mut entries = self.entries.lock();
        keys.iter()
            .map(|key| {
                let key = key.hash();
                match Self::live(&mut entries, &key).map(|s| &s.value) {
                    Some(Value::Scalar(raw)) => Ok(Some(raw.clone())),
                    Some(Value::Set(_)) => Err(wrong_type(&key)),
                    None => Ok(None),
                }
            })
            .collect()
    }

    async fn delete(&self, keys: &[CacheKey]) -> ChirpResult<u64> {
        let now = Instant::now();
        let mut entries = self.entries.lock();
        let deleted = keys
            .iter()
            .filter_map(|key| entries.remove(&key.hash()))
            .filter(|slot| slot.is_live(now))
            .count();
        Ok(deleted as u64)
    }

    async fn exists(&self, key: &CacheKey) -> ChirpResult<bool> {
        let mut entries = self.entries.lock();
        Ok(Self::live(&mut entries, &key.hash()).is_some())
    }

    async fn incr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        self.step(keys, 1)
    }

    async fn decr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        self.step(keys, -1)
    }

    async fn sadd_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let key = key.hash();
        let mut entries = self.entries.lock();
        match Self::live(&mut entries, &key) {
            Some(Slot {
                value: Value::Set(set),
                ..
            }) => set.extend(members.iter().cloned()),
            Some(_) => return Err(wrong_type(&key)),
            None => {
                entries.insert(
                    key,
                    Slot {
                        value: Value::Set(members.iter().cloned().collect()),
                        expires_at: None,
                    },
                );
            }
        }
        Ok(())
    }

    async fn smembers_raw(&self, key: &CacheKey) -> ChirpResult<Option<Vec<String>>> {
        let key = key.hash();
        let mut entries = self.entries.lock();
        match Self::live(&mut entries, &key).map(|s| &s.value) {
            Some(Value::Set(set)) => Ok(Some(set.iter().cloned().collect())),
            Some(Value::Scalar(_)) => Err(wrong_type(&key)),
            None => Ok(None),
        }
    }

    async fn sremove_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()> {
        let key = key.hash();
        let mut entries = self.entries.lock();
        let emptied = match Self::live(&mut entries, &key) {
            Some(Slot {
                value: Value::Set(set),
                ..
            }) => {
                for member in members {
                    set.remove(member);
                }
                set.is_empty()
            }
            Some(_) => return Err(wrong_type(&key)),
            None => false,
        };
        if emptied {
            entries.remove(&key);
        }
        Ok(())
    }

    async fn flush(&self) -> ChirpResult<()> {
        self.entries.lock().clear();
        Ok(())
    }
}
