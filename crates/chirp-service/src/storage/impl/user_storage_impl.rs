//! Cache-aside user storage.

use crate::cache::{cache_keys, CacheAccessor, CacheAccessorExt, CacheKey};
use crate::storage::{
    add_to_cached_set, adjust_counter, cached, cached_batch, collect_found, decoded, distinct,
    entry, log_write, storage_error, Delta, StorageSettings, UserStorage,
};
use async_trait::async_trait;
use chirp_core::{
    ChirpError, ChirpResult, NewUser, PublicUser, User, UserId, UserProfile, WorkerPool,
};
use chirp_repository::{FollowDao, SearchDao, UserDao};
use futures::FutureExt;
use shaku::Component;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy)]
enum Relation {
    Followers,
    Followees,
}

/// User storage orchestrator.
///
/// Profiles expire after `settings.ttl`. Follower/followee counters, the
/// follower/followee ID sets and the per-viewer `following` flags are written
/// without expiry and maintained on follow transitions.
#[derive(Component, Clone)]
#[shaku(interface = UserStorage)]
pub struct UserStorageImpl {
    #[shaku(inject)]
    cache: Arc<dyn CacheAccessor>,
    #[shaku(inject)]
    user_dao: Arc<dyn UserDao>,
    #[shaku(inject)]
    follow_dao: Arc<dyn FollowDao>,
    #[shaku(inject)]
    search_dao: Arc<dyn SearchDao>,
    settings: StorageSettings,
}

impl UserStorageImpl {
    /// Creates a new user storage.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheAccessor>,
        user_dao: Arc<dyn UserDao>,
        follow_dao: Arc<dyn FollowDao>,
        search_dao: Arc<dyn SearchDao>,
        settings: StorageSettings,
    ) -> Self {
        Self {
            cache,
            user_dao,
            follow_dao,
            search_dao,
            settings,
        }
    }

    async fn load_profile(&self, id: UserId) -> ChirpResult<UserProfile> {
        let key = cache_keys::user(id);
        if let Some(profile) = cached("user", self.cache.get_single::<UserProfile>(&key).await) {
            return Ok(profile);
        }

        let profile = self
            .user_dao
            .get_public_user_by_id(id)
            .await
            .map_err(|e| storage_error("get_public_user_by_id", e))?
            .ok_or_else(|| ChirpError::not_found("User", id))?;

        log_write(
            "user",
            self.cache.set(key, &profile, Some(self.settings.ttl)).await,
        );
        Ok(profile)
    }

    /// Fills counters and the viewer flag: one batched read, one batched write
    /// for whatever missed.
    async fn hydrate(
        &self,
        profile: UserProfile,
        viewer: Option<UserId>,
    ) -> ChirpResult<PublicUser> {
        let id = profile.id;
        let follower_key = cache_keys::user_follower_count(id);
        let followee_key = cache_keys::user_followee_count(id);

        let mut keys = vec![follower_key.clone(), followee_key.clone()];
        if let Some(viewer) = viewer {
            keys.push(cache_keys::user_following(id, viewer));
        }
        let raw = cached_batch("user_state", keys.len(), self.cache.get_raw(&keys).await);
        let mut misses = Vec::new();

        let follower_count = match decoded::<i64>("follower_count", raw[0].as_deref())
            .filter(|c| *c >= 0)
        {
            Some(count) => count,
            None => {
                let count = self
                    .follow_dao
                    .get_follower_count(id)
                    .await
                    .map_err(|e| storage_error("get_follower_count", e))?;
                misses.push(entry(follower_key, &count)?);
                count
            }
        };

        let followee_count = match decoded::<i64>("followee_count", raw[1].as_deref())
            .filter(|c| *c >= 0)
        {
            Some(count) => count,
            None => {
                let count = self
                    .follow_dao
                    .get_followee_count(id)
                    .await
                    .map_err(|e| storage_error("get_followee_count", e))?;
                misses.push(entry(followee_key, &count)?);
                count
            }
        };

        let following = match viewer {
            Some(viewer) => match decoded::<bool>("following", raw[2].as_deref()) {
                Some(flag) => flag,
                None => {
                    let flag = self
                        .follow_dao
                        .is_following(id, viewer)
                        .await
                        .map_err(|e| storage_error("is_following", e))?;
                    misses.push(entry(cache_keys::user_following(id, viewer), &flag)?);
                    flag
                }
            },
            None => false,
        };

        if !misses.is_empty() {
            log_write("user_state", self.cache.set_raw(&misses, None).await);
        }

        Ok(PublicUser::hydrate(
            profile,
            follower_count,
            followee_count,
            following,
        ))
    }

    fn relation_key(relation: Relation, id: UserId) -> CacheKey {
        match relation {
            Relation::Followers => cache_keys::user_followers(id),
            Relation::Followees => cache_keys::user_followees(id),
        }
    }

    /// Resolves a follower/followee ID set, cache-aside as a set.
    async fn relation_ids(&self, relation: Relation, id: UserId) -> ChirpResult<Vec<UserId>> {
        let key = Self::relation_key(relation, id);
        if let Some(ids) = cached("relation_ids", self.cache.smembers::<UserId>(&key).await) {
            return Ok(ids);
        }

        let ids = match relation {
            Relation::Followers => self.follow_dao.get_followers_ids(id).await,
            Relation::Followees => self.follow_dao.get_followees_ids(id).await,
        }
        .map_err(|e| storage_error("get_follow_ids", e))?;

        log_write("relation_ids", self.cache.sadd(&key, &ids).await);
        Ok(ids)
    }
}

#[async_trait]
impl UserStorage for UserStorageImpl {
    async fn insert_user(&self, user: &NewUser) -> ChirpResult<User> {
        debug!("Inserting user: {}", user.username);

        let user = self
            .user_dao
            .insert_user(user)
            .await
            .map_err(|e| storage_error("insert_user", e))?;

        log_write(
            "user",
            self.cache
                .set(cache_keys::user(user.id), &user.profile(), Some(self.settings.ttl))
                .await,
        );
        log_write(
            "user_counters",
            self.cache
                .set_many(
                    &[
                        (cache_keys::user_follower_count(user.id), 0_i64),
                        (cache_keys::user_followee_count(user.id), 0_i64),
                    ],
                    None,
                )
                .await,
        );

        info!("User created: {}", user.id);
        Ok(user)
    }

    async fn get_user_by_id(&self, id: UserId, viewer: Option<UserId>) -> ChirpResult<PublicUser> {
        let profile = self.load_profile(id).await?;
        self.hydrate(profile, viewer).await
    }

    async fn get_users_by_ids(
        &self,
        ids: &[UserId],
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        let ids = distinct(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Hydrating {} users", ids.len());

        let this = self.clone();
        let results = WorkerPool::process_all(self.settings.workers, ids, move |id| {
            let this = this.clone();
            async move { this.get_user_by_id(id, viewer).await }.boxed()
        })
        .await;

        collect_found(results)
    }

    async fn get_user_by_email(&self, email: &str) -> ChirpResult<User> {
        self.user_dao
            .get_user_by_email(email)
            .await
            .map_err(|e| storage_error("get_user_by_email", e))?
            .ok_or_else(|| ChirpError::not_found("User", email))
    }

    async fn update_last_login_time(&self, id: UserId) -> ChirpResult<()> {
        self.user_dao
            .update_user_last_login_time(id)
            .await
            .map_err(|e| storage_error("update_user_last_login_time", e))
    }

    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()> {
        self.load_profile(followee_id).await?;
        self.load_profile(follower_id).await?;

        let created = self
            .follow_dao
            .follow_user(followee_id, follower_id)
            .await
            .map_err(|e| storage_error("follow_user", e))?;

        if created {
            debug!("User {} now follows {}", follower_id, followee_id);
            let cache = self.cache.as_ref();
            adjust_counter(cache, cache_keys::user_follower_count(followee_id), Delta::Up).await;
            adjust_counter(cache, cache_keys::user_followee_count(follower_id), Delta::Up).await;
            add_to_cached_set(cache, cache_keys::user_followers(followee_id), &[follower_id]).await;
            add_to_cached_set(cache, cache_keys::user_followees(follower_id), &[followee_id]).await;
        }

        log_write(
            "following",
            self.cache
                .set(cache_keys::user_following(followee_id, follower_id), &true, None)
                .await,
        );
        Ok(())
    }

    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<()> {
        self.load_profile(followee_id).await?;
        self.load_profile(follower_id).await?;

        let removed = self
            .follow_dao
            .unfollow_user(followee_id, follower_id)
            .await
            .map_err(|e| storage_error("unfollow_user", e))?;

        if removed {
            debug!("User {} no longer follows {}", follower_id, followee_id);
            let cache = self.cache.as_ref();
            adjust_counter(cache, cache_keys::user_follower_count(followee_id), Delta::Down).await;
            adjust_counter(cache, cache_keys::user_followee_count(follower_id), Delta::Down).await;
            log_write(
                "followers",
                cache
                    .sremove(&cache_keys::user_followers(followee_id), &[follower_id])
                    .await,
            );
            log_write(
                "followees",
                cache
                    .sremove(&cache_keys::user_followees(follower_id), &[followee_id])
                    .await,
            );
        }

        log_write(
            "following",
            self.cache
                .set(cache_keys::user_following(followee_id, follower_id), &false, None)
                .await,
        );
        Ok(())
    }

    async fn get_followers(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        self.load_profile(id).await?;
        let ids = self.relation_ids(Relation::Followers, id).await?;
        self.get_users_by_ids(&ids, viewer).await
    }

    async fn get_followees(
        &self,
        id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        self.load_profile(id).await?;
        let ids = self.relation_ids(Relation::Followees, id).await?;
        self.get_users_by_ids(&ids, viewer).await
    }

    async fn get_followee_ids(&self, id: UserId) -> ChirpResult<Vec<UserId>> {
        self.relation_ids(Relation::Followees, id).await
    }

    async fn search_users(
        &self,
        query: &str,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<PublicUser>> {
        let key = cache_keys::search("user", query);
        let ids = match cached("search_users", self.cache.get_single::<Vec<UserId>>(&key).await) {
            Some(ids) => ids,
            None => {
                let ids = self
                    .search_dao
                    .get_users_ids(query)
                    .await
                    .map_err(|e| storage_error("get_users_ids", e))?;
                log_write(
                    "search_users",
                    self.cache.set(key, &ids, Some(self.settings.search_ttl)).await,
                );
                ids
            }
        };

        self.get_users_by_ids(&ids, viewer).await
    }
}

impl fmt::Debug for UserStorageImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UserStorageImpl")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
