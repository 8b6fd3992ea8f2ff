//! Composite-key cache accessor.
//!
//! Keys are ordered field lists ([`CacheKey`]) built by [`cache_keys`]. The
//! [`CacheAccessor`] trait exposes batched scalar, counter and set operations
//! over encoded values; [`CacheAccessorExt`] layers typed access on top. Redis
//! is the production backend, the in-memory backend serves tests and
//! single-node runs.

mod cache_interface;
pub mod cache_key;
pub mod cache_keys;
mod memory_cache;
mod redis_cache;

pub use cache_interface::{decode, encode, CacheAccessor, CacheAccessorExt, CacheEntry};
pub use cache_key::{CacheKey, KeyField};
pub use memory_cache::InMemoryCacheAccessor;
pub use redis_cache::{create_redis_pool, RedisCacheAccessor, RedisCacheAccessorParameters};
