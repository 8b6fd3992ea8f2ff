//! Redis-based cache accessor.

use super::{CacheAccessor, CacheEntry, CacheKey};
use async_trait::async_trait;
use chirp_config::RedisConfig;
use chirp_core::{ChirpError, ChirpResult};
use deadpool_redis::{Config, Pool, Runtime};
use redis::{AsyncCommands, RedisError};
use shaku::Component;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Creates a Redis connection pool and checks it with a `PING`.
pub async fn create_redis_pool(config: &RedisConfig) -> ChirpResult<Pool> {
    info!("Creating Redis connection pool...");

    let pool = Config::from_url(&config.url)
        .builder()
        .map_err(|e| ChirpError::Configuration(format!("Invalid Redis config: {}", e)))?
        .max_size(config.pool_size)
        .runtime(Runtime::Tokio1)
        .build()
        .map_err(|e| ChirpError::Configuration(format!("Failed to create Redis pool: {}", e)))?;

    let mut conn = pool
        .get()
        .await
        .map_err(|e| ChirpError::Cache(format!("Failed to get Redis connection: {}", e)))?;
    redis::cmd("PING")
        .query_async::<String>(&mut *conn)
        .await
        .map_err(|e| cache_error("PING", e))?;

    info!("Redis connection pool created successfully");
    Ok(pool)
}

fn cache_error(op: &str, err: RedisError) -> ChirpError {
    ChirpError::Cache(format!("Redis {} failed: {}", op, err))
}

fn hashed(keys: &[CacheKey]) -> Vec<String> {
    keys.iter().map(CacheKey::hash).collect()
}

/// Redis-backed cache accessor.
///
/// With no pool the accessor is disabled: reads miss, writes are dropped and
/// counters report an error.
#[derive(Component)]
#[shaku(interface = CacheAccessor)]
pub struct RedisCacheAccessor {
    /// Redis connection pool.
    pool: Option<Arc<Pool>>,
}

impl RedisCacheAccessor {
    /// Create a new Redis cache accessor.
    #[must_use]
    pub fn new(pool: Arc<Pool>) -> Self {
        Self { pool: Some(pool) }
    }

    /// Create a no-op accessor (for when Redis is disabled).
    #[must_use]
    pub fn disabled() -> Self {
        Self { pool: None }
    }

    /// Get a connection from the pool.
    async fn get_conn(&self) -> ChirpResult<deadpool_redis::Connection> {
        match &self.pool {
            Some(pool) => pool
                .get()
                .await
                .map_err(|e| ChirpError::Cache(format!("Failed to get Redis connection: {}", e))),
            None => Err(ChirpError::Cache("Cache is disabled".to_string())),
        }
    }

    async fn step(&self, keys: &[CacheKey], delta: i64) -> ChirpResult<Vec<i64>> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn().await?;
        let mut pipe = redis::pipe();
        for key in hashed(keys) {
            pipe.incr(key, delta);
        }

        pipe.query_async::<Vec<i64>>(&mut *conn)
            .await
            .map_err(|e| cache_error("INCRBY", e))
    }
}

#[async_trait]
impl CacheAccessor for RedisCacheAccessor {
    fn is_enabled(&self) -> bool {
        self.pool.is_some()
    }

    async fn set_raw(&self, entries: &[CacheEntry], ttl: Option<Duration>) -> ChirpResult<()> {
        if !self.is_enabled() || entries.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        let mut pipe = redis::pipe();
        for entry in entries {
            let key = entry.key.hash();
            match ttl {
                Some(ttl) => pipe.set_ex(key, &entry.value, ttl.as_secs().max(1)).ignore(),
                None => pipe.set(key, &entry.value).ignore(),
            };
        }

        pipe.query_async::<()>(&mut *conn)
            .await
            .map_err(|e| cache_error("SET", e))?;

        debug!("Cached {} keys (ttl: {:?})", entries.len(), ttl);
        Ok(())
    }

    async fn get_raw(&self, keys: &[CacheKey]) -> ChirpResult<Vec<Option<String>>> {
        if !self.is_enabled() {
            return Ok(vec![None; keys.len()]);
        }
        if keys.is_empty() {
            return Ok(Vec::new());
        }

        let mut conn = self.get_conn().await?;
        let mut pipe = redis::pipe();
        for key in hashed(keys) {
            pipe.get(key);
        }

        let values = pipe
            .query_async::<Vec<Option<String>>>(&mut *conn)
            .await
            .map_err(|e| cache_error("GET", e))?;

        let hits = values.iter().filter(|v| v.is_some()).count();
        debug!("Cache lookup: {} of {} keys hit", hits, keys.len());
        Ok(values)
    }

    async fn delete(&self, keys: &[CacheKey]) -> ChirpResult<u64> {
        if !self.is_enabled() || keys.is_empty() {
            return Ok(0);
        }

        let mut conn = self.get_conn().await?;
        let deleted: u64 = conn
            .del(hashed(keys))
            .await
            .map_err(|e| cache_error("DEL", e))?;

        debug!("Deleted {} of {} keys", deleted, keys.len());
        Ok(deleted)
    }

    async fn exists(&self, key: &CacheKey) -> ChirpResult<bool> {
        if !self.is_enabled() {
            return Ok(false);
        }

        let mut conn = self.get_conn().await?;
        conn.exists(key.hash())
            .await
            .map_err(|e| cache_error("EXISTS", e))
    }

    async fn incr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        self.step(keys, 1).await
    }

    async fn decr(&self, keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        self.step(keys, -1).await
    }

    async fn sadd_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()> {
        if !self.is_enabled() || members.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        conn.sadd::<_, _, ()>(key.hash(), members)
            .await
            .map_err(|e| cache_error("SADD", e))
    }

    async fn smembers_raw(&self, key: &CacheKey) -> ChirpResult<Option<Vec<String>>> {
        if !self.is_enabled() {
            return Ok(None);
        }

        let mut conn = self.get_conn().await?;
        let members: Vec<String> = conn
            .smembers(key.hash())
            .await
            .map_err(|e| cache_error("SMEMBERS", e))?;

        Ok((!members.is_empty()).then_some(members))
    }

    async fn sremove_raw(&self, key: &CacheKey, members: &[String]) -> ChirpResult<()> {
        if !self.is_enabled() || members.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        conn.srem::<_, _, ()>(key.hash(), members)
            .await
            .map_err(|e| cache_error("SREM", e))
    }

    async fn flush(&self) -> ChirpResult<()> {
        if !self.is_enabled() {
            return Ok(());
        }

        let mut conn = self.get_conn().await?;
        redis::cmd("FLUSHDB")
            .query_async::<()>(&mut *conn)
            .await
            .map_err(|e| cache_error("FLUSHDB", e))?;

        info!("Cache flushed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{cache_keys, CacheAccessorExt};
    use chirp_core::TweetId;

    #[test]
    fn test_disabled_cache() {
        let cache = RedisCacheAccessor::disabled();
        assert!(!cache.is_enabled());
    }

    #[tokio::test]
    async fn test_disabled_cache_misses_and_drops_writes() {
        let cache = RedisCacheAccessor::disabled();
        let key = cache_keys::tweet(TweetId(1));

        cache.set(key.clone(), &"hello", None).await.unwrap();
        assert_eq!(cache.get_single::<String>(&key).await.unwrap(), None);
        assert!(!cache.exists(&key).await.unwrap());
        assert_eq!(cache.smembers::<i64>(&key).await.unwrap(), None);
        assert_eq!(cache.delete(&[key.clone()]).await.unwrap(), 0);
        assert!(matches!(
            cache.incr(&[key]).await,
            Err(ChirpError::Cache(_))
        ));
    }
}
