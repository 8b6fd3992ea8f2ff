//! Dependency injection module using Shaku.
//!
//! `StorageModule` holds the whole storage stack of a single process: the
//! MySQL pool and DAOs, the cache accessor, both orchestrators and the
//! services on top of them. See [`crate::bootstrap`] for building it from
//! configuration.

use crate::cache::{CacheAccessor, RedisCacheAccessor};
use crate::r#impl::{TweetServiceImpl, UserServiceImpl};
use crate::storage::{TweetStorage, TweetStorageImpl, UserStorage, UserStorageImpl};
use crate::tweet_service::TweetService;
use crate::user_service::UserService;
use chirp_core::{module, HasComponent};
use chirp_repository::{
    DatabasePool, DatabasePoolInterface, MySqlFollowDaoImpl, MySqlLikeDaoImpl,
    MySqlSearchDaoImpl, MySqlTweetDaoImpl, MySqlUserDaoImpl,
};
use std::sync::Arc;

module! {
    pub StorageModule {
        components = [
            DatabasePool,
            MySqlTweetDaoImpl,
            MySqlLikeDaoImpl,
            MySqlUserDaoImpl,
            MySqlFollowDaoImpl,
            MySqlSearchDaoImpl,
            RedisCacheAccessor,
            UserStorageImpl,
            TweetStorageImpl,
            TweetServiceImpl,
            UserServiceImpl,
        ],
        providers = [],
    }
}

/// Resolves the services from a module.
pub trait ServiceResolver {
    /// Resolves the tweet service.
    fn tweet_service(&self) -> Arc<dyn TweetService>;

    /// Resolves the user service.
    fn user_service(&self) -> Arc<dyn UserService>;
}

impl ServiceResolver for StorageModule {
    fn tweet_service(&self) -> Arc<dyn TweetService> {
        self.resolve()
    }

    fn user_service(&self) -> Arc<dyn UserService> {
        self.resolve()
    }
}

/// Resolves the storage orchestrators and their infrastructure.
pub trait StorageResolver {
    /// Resolves the tweet orchestrator.
    fn tweet_storage(&self) -> Arc<dyn TweetStorage>;

    /// Resolves the user orchestrator.
    fn user_storage(&self) -> Arc<dyn UserStorage>;

    /// Resolves the cache accessor.
    fn cache(&self) -> Arc<dyn CacheAccessor>;

    /// Resolves the database pool.
    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface>;
}

impl StorageResolver for StorageModule {
    fn tweet_storage(&self) -> Arc<dyn TweetStorage> {
        self.resolve()
    }

    fn user_storage(&self) -> Arc<dyn UserStorage> {
        self.resolve()
    }

    fn cache(&self) -> Arc<dyn CacheAccessor> {
        self.resolve()
    }

    fn database_pool(&self) -> Arc<dyn DatabasePoolInterface> {
        self.resolve()
    }
}
