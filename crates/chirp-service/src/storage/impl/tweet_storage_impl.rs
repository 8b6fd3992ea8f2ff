//! Cache-aside tweet storage.

use crate::cache::{cache_keys, CacheAccessor, CacheAccessorExt};
use crate::storage::{
    add_to_cached_set, adjust_counter, cached, cached_batch, collect_found, decoded, distinct,
    entry, log_write, storage_error, Delta, StorageSettings, TweetStorage, UserStorage,
};
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult, Tweet, TweetId, TweetRecord, UserId, WorkerPool};
use chirp_repository::{LikeDao, SearchDao, TweetDao};
use futures::FutureExt;
use shaku::Component;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Tweet storage orchestrator.
///
/// Tweet records expire after `settings.ttl` and search results after
/// `settings.search_ttl`. Like counters, per-viewer `liked` flags and each
/// author's tweet-ID set never expire; likes and deletes maintain them.
#[derive(Component, Clone)]
#[shaku(interface = TweetStorage)]
pub struct TweetStorageImpl {
    #[shaku(inject)]
    cache: Arc<dyn CacheAccessor>,
    #[shaku(inject)]
    tweet_dao: Arc<dyn TweetDao>,
    #[shaku(inject)]
    like_dao: Arc<dyn LikeDao>,
    #[shaku(inject)]
    search_dao: Arc<dyn SearchDao>,
    #[shaku(inject)]
    user_storage: Arc<dyn UserStorage>,
    settings: StorageSettings,
}

impl TweetStorageImpl {
    /// Creates a new tweet storage.
    #[must_use]
    pub fn new(
        cache: Arc<dyn CacheAccessor>,
        tweet_dao: Arc<dyn TweetDao>,
        like_dao: Arc<dyn LikeDao>,
        search_dao: Arc<dyn SearchDao>,
        user_storage: Arc<dyn UserStorage>,
        settings: StorageSettings,
    ) -> Self {
        Self {
            cache,
            tweet_dao,
            like_dao,
            search_dao,
            user_storage,
            settings,
        }
    }

    async fn load_record(&self, id: TweetId) -> ChirpResult<TweetRecord> {
        let key = cache_keys::tweet(id);
        if let Some(record) = cached("tweet", self.cache.get_single::<TweetRecord>(&key).await) {
            return Ok(record);
        }

        let record = self
            .tweet_dao
            .get_tweet_by_id(id)
            .await
            .map_err(|e| storage_error("get_tweet_by_id", e))?
            .ok_or_else(|| ChirpError::not_found("Tweet", id))?;

        log_write(
            "tweet",
            self.cache.set(key, &record, Some(self.settings.ttl)).await,
        );
        Ok(record)
    }

    /// Loads records for `ids`: one pipelined cache read, then at most one DAO
    /// query for the misses. IDs with no row are dropped.
    async fn load_records(&self, ids: &[TweetId]) -> ChirpResult<Vec<TweetRecord>> {
        let keys: Vec<_> = ids.iter().copied().map(cache_keys::tweet).collect();
        let raw = cached_batch("tweets", keys.len(), self.cache.get_raw(&keys).await);

        let mut records = Vec::with_capacity(ids.len());
        let mut missing = Vec::new();
        for (id, raw) in ids.iter().zip(raw) {
            match decoded::<TweetRecord>("tweet", raw.as_deref()) {
                Some(record) => records.push(record),
                None => missing.push(*id),
            }
        }
        debug!(
            "Tweet batch: {} cached, {} from store",
            records.len(),
            missing.len()
        );

        if !missing.is_empty() {
            let loaded = self
                .tweet_dao
                .get_tweets_by_ids(&missing)
                .await
                .map_err(|e| storage_error("get_tweets_by_ids", e))?;

            let entries: Vec<_> = loaded
                .iter()
                .map(|record| (cache_keys::tweet(record.id), record))
                .collect();
            log_write(
                "tweets",
                self.cache.set_many(&entries, Some(self.settings.ttl)).await,
            );
            records.extend(loaded);
        }

        Ok(records)
    }

    /// Resolves the like counter and viewer flag: one batched read, one
    /// batched write for whatever missed.
    async fn like_state(&self, id: TweetId, viewer: Option<UserId>) -> ChirpResult<(i64, bool)> {
        let count_key = cache_keys::tweet_like_count(id);
        let mut keys = vec![count_key.clone()];
        if let Some(viewer) = viewer {
            keys.push(cache_keys::tweet_liked(id, viewer));
        }
        let raw = cached_batch("like_state", keys.len(), self.cache.get_raw(&keys).await);
        let mut misses = Vec::new();

        let like_count = match decoded::<i64>("like_count", raw[0].as_deref()).filter(|c| *c >= 0) {
            Some(count) => count,
            None => {
                let count = self
                    .like_dao
                    .get_like_count(id)
                    .await
                    .map_err(|e| storage_error("get_like_count", e))?;
                misses.push(entry(count_key, &count)?);
                count
            }
        };

        let liked = match viewer {
            Some(viewer) => match decoded::<bool>("liked", raw[1].as_deref()) {
                Some(flag) => flag,
                None => {
                    let flag = self
                        .like_dao
                        .is_liked(id, viewer)
                        .await
                        .map_err(|e| storage_error("is_liked", e))?;
                    misses.push(entry(cache_keys::tweet_liked(id, viewer), &flag)?);
                    flag
                }
            },
            None => false,
        };

        if !misses.is_empty() {
            log_write("like_state", self.cache.set_raw(&misses, None).await);
        }
        Ok((like_count, liked))
    }

    async fn hydrate(&self, record: TweetRecord, viewer: Option<UserId>) -> ChirpResult<Tweet> {
        let author = self
            .user_storage
            .get_user_by_id(record.author_id, viewer)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    warn!(
                        tweet = %record.id,
                        author = %record.author_id,
                        "Tweet author is missing"
                    );
                    ChirpError::Unexpected
                } else {
                    e
                }
            })?;
        let (like_count, liked) = self.like_state(record.id, viewer).await?;
        Ok(Tweet::hydrate(record, author, like_count, liked))
    }

    async fn hydrate_all(
        &self,
        records: Vec<TweetRecord>,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }
        debug!("Hydrating {} tweets", records.len());

        let this = self.clone();
        let results = WorkerPool::process_all(self.settings.workers, records, move |record| {
            let this = this.clone();
            async move { this.hydrate(record, viewer).await }.boxed()
        })
        .await;

        collect_found(results)
    }

    async fn author_tweet_ids(&self, author_id: UserId) -> ChirpResult<Vec<TweetId>> {
        let key = cache_keys::user_tweet_ids(author_id);
        if let Some(ids) = cached("user_tweet_ids", self.cache.smembers::<TweetId>(&key).await) {
            return Ok(ids);
        }

        let ids = self
            .tweet_dao
            .get_tweet_ids_by_author_id(author_id)
            .await
            .map_err(|e| storage_error("get_tweet_ids_by_author_id", e))?;

        log_write("user_tweet_ids", self.cache.sadd(&key, &ids).await);
        Ok(ids)
    }

    async fn search_ids(&self, query: &str) -> ChirpResult<Vec<TweetId>> {
        let key = cache_keys::search("tweet", query);
        let hit = self.cache.get_single::<Vec<TweetId>>(&key).await;
        if let Some(ids) = cached("search_tweets", hit) {
            return Ok(ids);
        }

        let ids = self
            .search_dao
            .get_tweets_ids(query)
            .await
            .map_err(|e| storage_error("get_tweets_ids", e))?;

        log_write(
            "search_tweets",
            self.cache.set(key, &ids, Some(self.settings.search_ttl)).await,
        );
        Ok(ids)
    }
}

#[async_trait]
impl TweetStorage for TweetStorageImpl {
    async fn insert_tweet(&self, author_id: UserId, content: &str) -> ChirpResult<Tweet> {
        let author = self.user_storage.get_user_by_id(author_id, None).await?;

        let record = self
            .tweet_dao
            .insert_tweet(author_id, content)
            .await
            .map_err(|e| storage_error("insert_tweet", e))?;

        log_write(
            "tweet",
            self.cache
                .set(cache_keys::tweet(record.id), &record, Some(self.settings.ttl))
                .await,
        );
        log_write(
            "like_count",
            self.cache
                .set(cache_keys::tweet_like_count(record.id), &0_i64, None)
                .await,
        );
        add_to_cached_set(
            self.cache.as_ref(),
            cache_keys::user_tweet_ids(author_id),
            &[record.id],
        )
        .await;

        info!("Tweet created: {} by {}", record.id, author_id);
        Ok(Tweet::hydrate(record, author, 0, false))
    }

    async fn get_tweet(&self, id: TweetId, viewer: Option<UserId>) -> ChirpResult<Tweet> {
        let record = self.load_record(id).await?;
        self.hydrate(record, viewer).await
    }

    async fn get_tweets_by_ids(
        &self,
        ids: &[TweetId],
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>> {
        let ids = distinct(ids);
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let records = self.load_records(&ids).await?;
        self.hydrate_all(records, viewer).await
    }

    async fn get_tweets_by_author(
        &self,
        author_id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>> {
        let ids = self.author_tweet_ids(author_id).await?;
        self.get_tweets_by_ids(&ids, viewer).await
    }

    async fn search_tweets(&self, query: &str, viewer: Option<UserId>) -> ChirpResult<Vec<Tweet>> {
        let ids = self.search_ids(query).await?;
        self.get_tweets_by_ids(&ids, viewer).await
    }

    async fn delete_tweet(&self, id: TweetId) -> ChirpResult<()> {
        let record = self.load_record(id).await?;

        let deleted = self
            .tweet_dao
            .delete_tweet(id)
            .await
            .map_err(|e| storage_error("delete_tweet", e))?;
        if !deleted {
            return Err(ChirpError::not_found("Tweet", id));
        }

        log_write(
            "tweet",
            self.cache
                .delete(&[cache_keys::tweet(id), cache_keys::tweet_like_count(id)])
                .await,
        );
        log_write(
            "user_tweet_ids",
            self.cache
                .sremove(&cache_keys::user_tweet_ids(record.author_id), &[id])
                .await,
        );

        info!("Tweet deleted: {}", id);
        Ok(())
    }

    async fn like_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()> {
        self.load_record(id).await?;

        let created = self
            .like_dao
            .like_tweet(id, viewer)
            .await
            .map_err(|e| storage_error("like_tweet", e))?;

        if created {
            debug!("User {} liked tweet {}", viewer, id);
            adjust_counter(self.cache.as_ref(), cache_keys::tweet_like_count(id), Delta::Up).await;
        }

        log_write(
            "liked",
            self.cache
                .set(cache_keys::tweet_liked(id, viewer), &true, None)
                .await,
        );
        Ok(())
    }

    async fn unlike_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()> {
        self.load_record(id).await?;

        let removed = self
            .like_dao
            .unlike_tweet(id, viewer)
            .await
            .map_err(|e| storage_error("unlike_tweet", e))?;

        if removed {
            debug!("User {} unliked tweet {}", viewer, id);
            let key = cache_keys::tweet_like_count(id);
            adjust_counter(self.cache.as_ref(), key, Delta::Down).await;
        }

        log_write(
            "liked",
            self.cache
                .set(cache_keys::tweet_liked(id, viewer), &false, None)
                .await,
        );
        Ok(())
    }
}

impl fmt::Debug for TweetStorageImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TweetStorageImpl")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
