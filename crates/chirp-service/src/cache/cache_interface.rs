//! Cache accessor trait for composite-key scalar, counter and set storage.

use super::CacheKey;
use async_trait::async_trait;
use chirp_core::ChirpResult;
use serde::{de::DeserializeOwned, Serialize};
use shaku::Interface;
use std::time::Duration;

/// Encodes a value with the cache codec (JSON).
///
/// Integers come out as plain base-10 text, which is what lets `incr`/`decr`
/// operate on cached counters server-side.
pub fn encode<V: Serialize + ?Sized>(value: &V) -> ChirpResult<String> {
    Ok(serde_json::to_string(value)?)
}

/// Decodes a value written by [`encode`]. A shape mismatch is an error.
pub fn decode<V: DeserializeOwned>(raw: &str) -> ChirpResult<V> {
    Ok(serde_json::from_str(raw)?)
}

/// An encoded value ready to be written under a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheEntry {
    pub key: CacheKey,
    pub value: String,
}

impl CacheEntry {
    /// Encodes `value` for `key`.
    pub fn new<V: Serialize + ?Sized>(key: CacheKey, value: &V) -> ChirpResult<Self> {
        Ok(Self {
            key,
            value: encode(value)?,
        })
    }
}

/// Composite-key cache accessor.
///
/// Every batch operation is a single round trip where the backend supports it.
/// Values are stored encoded; use [`CacheAccessorExt`] for typed access.
/// A missing key is never an error.
#[async_trait]
pub trait CacheAccessor: Interface + Send + Sync {
    /// Upserts every entry. `ttl = None` writes without expiry.
    async fn set_raw(&self, entries: &[CacheEntry], ttl: Option<Duration>) -> ChirpResult<()>;

    /// Reads every key; the result is positional, `None` for a missing key.
    async fn get_raw(&self, keys: &[CacheKey]) -> ChirpResult<Vec<Option<String>>>;

    /// Removes every key. Returns how many existed.
    async fn delete(&self, keys: &[CacheKey]) -> ChirpResult<u64>;

    /// Checks whether a key exists, whatever its shape.
    async fn exists(&self, key: &CacheKey) -> ChirpResult<bool>;

    /// Atomically increments each counter, creating missing ones at 1.
    async fn incr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>>;

    /// Atomically decrements each counter, creating missing ones at -1.
    async fn decr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>>;

    /// Adds encoded members to a set, creating it if needed.
    async fn sadd_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()>;

    /// Reads a set. `None` when the set is missing or empty.
    async fn smembers_raw(&self, key: &CacheKey) -> ChirpResult<Option<Vec<String>>>;

    /// Removes encoded members from a set.
    async fn sremove_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()>;

    /// Wipes every entry. Administrative and test use only.
    async fn flush(&self) -> ChirpResult<()>;

    /// Check if caching is enabled.
    fn is_enabled(&self) -> bool;
}

/// Typed helpers over [`CacheAccessor`].
#[async_trait]
pub trait CacheAccessorExt: CacheAccessor {
    /// Sets one typed value.
    async fn set<V: Serialize + Sync + ?Sized>(
        &self,
        key: CacheKey,
        value: &V,
        ttl: Option<Duration>,
    ) -> ChirpResult<()> {
        let entry = CacheEntry::new(key, value)?;
        self.set_raw(std::slice::from_ref(&entry), ttl).await
    }

    /// Sets many values of one type in a single batch.
    async fn set_many<V: Serialize + Sync>(
        &self,
        entries: &[(CacheKey, V)],
        ttl: Option<Duration>,
    ) -> ChirpResult<()> {
        if entries.is_empty() {
            return Ok(());
        }
        let encoded = entries
            .iter()
            .map(|(key, value)| CacheEntry::new(key.clone(), value))
            .collect::<ChirpResult<Vec<_>>>()?;
        self.set_raw(&encoded, ttl).await
    }

    /// Gets one typed value.
    async fn get_single<V: DeserializeOwned + Send>(
        &self,
        key: &CacheKey,
    ) -> ChirpResult<Option<V>> {
        let mut values = self.get::<V>(std::slice::from_ref(key)).await?;
        Ok(values.pop().flatten())
    }

    /// Gets many values of one type in a single batch, positionally.
    async fn get<V: DeserializeOwned + Send>(
        &self,
        keys: &[CacheKey],
    ) -> ChirpResult<Vec<Option<V>>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        self.get_raw(keys)
            .await?
            .into_iter()
            .map(|raw| raw.as_deref().map(decode::<V>).transpose())
            .collect()
    }

    /// Adds typed members to a set. An empty member list is a no-op.
    async fn sadd<V: Serialize + Sync>(&self, key: &CacheKey, members: &[V]) -> ChirpResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let encoded = members.iter().map(|m| encode(m)).collect::<ChirpResult<Vec<_>>>()?;
        self.sadd_raw(key, &encoded).await
    }

    /// Reads a typed set. `None` when the set is missing or empty.
    async fn smembers<V: DeserializeOwned + Send>(
        &self,
        key: &CacheKey,
    ) -> ChirpResult<Option<Vec<V>>> {
        match self.smembers_raw(key).await? {
            Some(raw) => Ok(Some(
                raw.iter()
                    .map(|m| decode::<V>(m))
                    .collect::<ChirpResult<Vec<_>>>()?,
            )),
            None => Ok(None),
        }
    }

    /// Removes typed members from a set.
    async fn sremove<V: Serialize + Sync>(&self, key: &CacheKey, members: &[V]) -> ChirpResult<()> {
        if members.is_empty() {
            return Ok(());
        }
        let encoded = members.iter().map(|m| encode(m)).collect::<ChirpResult<Vec<_>>>()?;
        self.sremove_raw(key, &encoded).await
    }
}

// Blanket implementation for all CacheAccessor implementations
impl<T: CacheAccessor + ?Sized> CacheAccessorExt for T {}
