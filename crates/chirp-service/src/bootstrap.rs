//! Builds the [`StorageModule`] from configuration.

use crate::cache::{create_redis_pool, RedisCacheAccessor, RedisCacheAccessorParameters};
use crate::di::StorageModule;
use crate::storage::{
    StorageSettings, TweetStorageImpl, TweetStorageImplParameters, UserStorageImpl,
    UserStorageImplParameters,
};
use chirp_config::AppConfig;
use chirp_core::ChirpResult;
use chirp_repository::{DatabasePool, DatabasePoolInterface, DatabasePoolParameters};
use std::sync::Arc;
use tracing::{info, warn};

/// Builds the storage module with every dependency connected.
///
/// MySQL is mandatory. Redis is only contacted when `redis.enabled` is set;
/// otherwise the cache accessor runs disabled and every read goes to MySQL.
pub async fn build_storage_module(config: &AppConfig) -> ChirpResult<Arc<StorageModule>> {
    let db_pool = DatabasePool::connect(&config.database).await?;

    let cache_pool = if config.redis.enabled {
        Some(Arc::new(create_redis_pool(&config.redis).await?))
    } else {
        warn!("Redis is disabled, storage will read through to MySQL");
        None
    };

    let settings = StorageSettings::from(&config.cache);
    info!(
        ttl_secs = settings.ttl.as_secs(),
        search_ttl_secs = settings.search_ttl.as_secs(),
        workers = settings.workers,
        "Building storage module"
    );

    let module = StorageModule::builder()
        .with_component_parameters::<DatabasePool>(DatabasePoolParameters {
            pool: db_pool.inner().clone(),
        })
        .with_component_parameters::<RedisCacheAccessor>(RedisCacheAccessorParameters {
            pool: cache_pool,
        })
        .with_component_parameters::<UserStorageImpl>(UserStorageImplParameters { settings })
        .with_component_parameters::<TweetStorageImpl>(TweetStorageImplParameters { settings })
        .build();

    Ok(Arc::new(module))
}
