//! Shared fixtures for storage and service tests.
//!
//! `FakeStore` stands in for MySQL: one in-memory table set implementing every
//! DAO trait, with per-method call counters and a switch that makes every DAO
//! call fail.

#![allow(dead_code)]

use async_trait::async_trait;
use chirp_core::{
    ChirpError, ChirpResult, NewUser, TweetId, TweetRecord, User, UserId, UserProfile,
};
use chirp_repository::{FollowDao, LikeDao, SearchDao, TweetDao, UserDao};
use chirp_service::{
    CacheAccessor, CacheEntry, CacheKey, InMemoryCacheAccessor, StorageSettings, TweetServiceImpl,
    TweetStorageImpl, UserServiceImpl, UserStorageImpl,
};
use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Fixed base so tweet timestamps follow their IDs.
const EPOCH: i64 = 1_700_000_000;

#[derive(Default)]
struct Tables {
    users: BTreeMap<UserId, User>,
    tweets: BTreeMap<TweetId, TweetRecord>,
    /// (followee, follower)
    follows: BTreeSet<(UserId, UserId)>,
    /// (tweet, user)
    likes: BTreeSet<(TweetId, UserId)>,
    next_user: i64,
    next_tweet: i64,
}

/// In-memory stand-in for every DAO.
#[derive(Default)]
pub struct FakeStore {
    tables: Mutex<Tables>,
    calls: Mutex<HashMap<&'static str, usize>>,
    batches: Mutex<Vec<Vec<TweetId>>>,
    failing: AtomicBool,
}

impl FakeStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes every subsequent DAO call fail (or succeed again).
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times the DAO method `op` was called.
    pub fn calls(&self, op: &str) -> usize {
        self.calls.lock().get(op).copied().unwrap_or(0)
    }

    /// Total DAO calls so far.
    pub fn total_calls(&self) -> usize {
        self.calls.lock().values().sum()
    }

    /// ID lists passed to `get_tweets_by_ids`, in call order.
    pub fn tweet_batches(&self) -> Vec<Vec<TweetId>> {
        self.batches.lock().clone()
    }

    fn enter(&self, op: &'static str) -> ChirpResult<()> {
        *self.calls.lock().entry(op).or_insert(0) += 1;
        if self.failing.load(Ordering::SeqCst) {
            return Err(ChirpError::Database(format!("{} failed: connection refused", op)));
        }
        Ok(())
    }

    /// Adds a user row directly, bypassing the orchestrators.
    pub fn seed_user(&self, username: &str) -> UserId {
        let mut tables = self.tables.lock();
        tables.next_user += 1;
        let id = UserId(tables.next_user);
        tables.users.insert(id, user_row(id, username));
        id
    }

    /// Adds a tweet row directly, bypassing the orchestrators.
    pub fn seed_tweet(&self, author_id: UserId, content: &str) -> TweetId {
        let mut tables = self.tables.lock();
        tables.next_tweet += 1;
        let id = TweetId(tables.next_tweet);
        tables.tweets.insert(id, tweet_row(id, author_id, content));
        id
    }

    /// Adds a like edge directly, bypassing the orchestrators.
    pub fn seed_like(&self, tweet_id: TweetId, user_id: UserId) {
        self.tables.lock().likes.insert((tweet_id, user_id));
    }

    /// Adds a follow edge directly, bypassing the orchestrators.
    pub fn seed_follow(&self, followee_id: UserId, follower_id: UserId) {
        self.tables.lock().follows.insert((followee_id, follower_id));
    }

    /// Removes a user row directly, leaving its tweets behind.
    pub fn remove_user(&self, id: UserId) {
        self.tables.lock().users.remove(&id);
    }

    pub fn last_login(&self, id: UserId) -> Option<DateTime<Utc>> {
        self.tables.lock().users.get(&id).and_then(|u| u.last_login_at)
    }
}

fn timestamp(offset: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(EPOCH + offset, 0).unwrap()
}

fn user_row(id: UserId, username: &str) -> User {
    User {
        id,
        username: username.to_string(),
        email: format!("{}@example.com", username),
        display_name: capitalize(username),
        avatar_url: None,
        password_hash: "$argon2id$hash".to_string(),
        created_at: timestamp(0),
        last_login_at: None,
    }
}

fn tweet_row(id: TweetId, author_id: UserId, content: &str) -> TweetRecord {
    TweetRecord {
        id,
        author_id,
        content: content.to_string(),
        created_at: timestamp(id.0),
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[async_trait]
impl TweetDao for FakeStore {
    async fn get_tweet_by_id(&self, id: TweetId) -> ChirpResult<Option<TweetRecord>> {
        self.enter("get_tweet_by_id")?;
        Ok(self.tables.lock().tweets.get(&id).cloned())
    }

    async fn get_tweets_by_ids(&self, ids: &[TweetId]) -> ChirpResult<Vec<TweetRecord>> {
        self.enter("get_tweets_by_ids")?;
        self.batches.lock().push(ids.to_vec());
        let tables = self.tables.lock();
        Ok(ids
            .iter()
            .filter_map(|id| tables.tweets.get(id).cloned())
            .collect())
    }

    async fn insert_tweet(&self, author_id: UserId, content: &str) -> ChirpResult<TweetRecord> {
        self.enter("insert_tweet")?;
        let mut tables = self.tables.lock();
        tables.next_tweet += 1;
        let id = TweetId(tables.next_tweet);
        let record = tweet_row(id, author_id, content);
        tables.tweets.insert(id, record.clone());
        Ok(record)
    }

    async fn delete_tweet(&self, id: TweetId) -> ChirpResult<bool> {
        self.enter("delete_tweet")?;
        let mut tables = self.tables.lock();
        tables.likes.retain(|(tweet, _)| *tweet != id);
        Ok(tables.tweets.remove(&id).is_some())
    }

    async fn get_tweet_ids_by_author_id(&self, author_id: UserId) -> ChirpResult<Vec<TweetId>> {
        self.enter("get_tweet_ids_by_author_id")?;
        Ok(self
            .tables
            .lock()
            .tweets
            .values()
            .filter(|t| t.author_id == author_id)
            .map(|t| t.id)
            .collect())
    }
}

#[async_trait]
impl LikeDao for FakeStore {
    async fn like_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        self.enter("like_tweet")?;
        Ok(self.tables.lock().likes.insert((tweet_id, user_id)))
    }

    async fn unlike_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        self.enter("unlike_tweet")?;
        Ok(self.tables.lock().likes.remove(&(tweet_id, user_id)))
    }

    async fn get_like_count(&self, tweet_id: TweetId) -> ChirpResult<i64> {
        self.enter("get_like_count")?;
        let count = self
            .tables
            .lock()
            .likes
            .iter()
            .filter(|(tweet, _)| *tweet == tweet_id)
            .count();
        Ok(count as i64)
    }

    async fn is_liked(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        self.enter("is_liked")?;
        Ok(self.tables.lock().likes.contains(&(tweet_id, user_id)))
    }
}

#[async_trait]
impl UserDao for FakeStore {
    async fn get_public_user_by_id(&self, id: UserId) -> ChirpResult<Option<UserProfile>> {
        self.enter("get_public_user_by_id")?;
        Ok(self.tables.lock().users.get(&id).map(User::profile))
    }

    async fn get_user_by_email(&self, email: &str) -> ChirpResult<Option<User>> {
        self.enter("get_user_by_email")?;
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn insert_user(&self, user: &NewUser) -> ChirpResult<User> {
        self.enter("insert_user")?;
        let mut tables = self.tables.lock();
        if tables
            .users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(ChirpError::conflict("Duplicate entry for users"));
        }

        tables.next_user += 1;
        let id = UserId(tables.next_user);
        let row = User {
            id,
            username: user.username.clone(),
            email: user.email.clone(),
            display_name: user.display_name.clone(),
            avatar_url: user.avatar_url.clone(),
            password_hash: user.password_hash.clone(),
            created_at: Utc::now(),
            last_login_at: None,
        };
        tables.users.insert(id, row.clone());
        Ok(row)
    }

    async fn update_user_last_login_time(&self, id: UserId) -> ChirpResult<()> {
        self.enter("update_user_last_login_time")?;
        match self.tables.lock().users.get_mut(&id) {
            Some(user) => {
                user.last_login_at = Some(Utc::now());
                Ok(())
            }
            None => Err(ChirpError::not_found("User", id)),
        }
    }
}

#[async_trait]
impl FollowDao for FakeStore {
    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        self.enter("follow_user")?;
        Ok(self.tables.lock().follows.insert((followee_id, follower_id)))
    }

    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        self.enter("unfollow_user")?;
        Ok(self.tables.lock().follows.remove(&(followee_id, follower_id)))
    }

    async fn get_followers_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>> {
        self.enter("get_followers_ids")?;
        Ok(self
            .tables
            .lock()
            .follows
            .iter()
            .filter(|(followee, _)| *followee == user_id)
            .map(|(_, follower)| *follower)
            .collect())
    }

    async fn get_followees_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>> {
        self.enter("get_followees_ids")?;
        Ok(self
            .tables
            .lock()
            .follows
            .iter()
            .filter(|(_, follower)| *follower == user_id)
            .map(|(followee, _)| *followee)
            .collect())
    }

    async fn get_follower_count(&self, user_id: UserId) -> ChirpResult<i64> {
        self.enter("get_follower_count")?;
        let count = self
            .tables
            .lock()
            .follows
            .iter()
            .filter(|(followee, _)| *followee == user_id)
            .count();
        Ok(count as i64)
    }

    async fn get_followee_count(&self, user_id: UserId) -> ChirpResult<i64> {
        self.enter("get_followee_count")?;
        let count = self
            .tables
            .lock()
            .follows
            .iter()
            .filter(|(_, follower)| *follower == user_id)
            .count();
        Ok(count as i64)
    }

    async fn is_following(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        self.enter("is_following")?;
        Ok(self.tables.lock().follows.contains(&(followee_id, follower_id)))
    }
}

#[async_trait]
impl SearchDao for FakeStore {
    async fn get_tweets_ids(&self, query: &str) -> ChirpResult<Vec<TweetId>> {
        self.enter("get_tweets_ids")?;
        let query = query.to_lowercase();
        Ok(self
            .tables
            .lock()
            .tweets
            .values()
            .filter(|t| t.content.to_lowercase().contains(&query))
            .map(|t| t.id)
            .collect())
    }

    async fn get_users_ids(&self, query: &str) -> ChirpResult<Vec<UserId>> {
        self.enter("get_users_ids")?;
        let query = query.to_lowercase();
        Ok(self
            .tables
            .lock()
            .users
            .values()
            .filter(|u| {
                u.username.to_lowercase().contains(&query)
                    || u.display_name.to_lowercase().contains(&query)
            })
            .map(|u| u.id)
            .collect())
    }
}

/// Cache backend whose every operation fails, as if Redis were unreachable.
#[derive(Debug, Default)]
pub struct UnreachableCache;

fn unreachable_cache() -> ChirpError {
    ChirpError::Cache("Failed to get Redis connection: Connection refused".to_string())
}

#[async_trait]
impl CacheAccessor for UnreachableCache {
    async fn set_raw(&self, _entries: &[CacheEntry], _ttl: Option<Duration>) -> ChirpResult<()> {
        Err(unreachable_cache())
    }

    async fn get_raw(&self, _keys: &[CacheKey]) -> ChirpResult<Vec<Option<String>>> {
        Err(unreachable_cache())
    }

    async fn delete(&self, _keys: &[CacheKey]) -> ChirpResult<u64> {
        Err(unreachable_cache())
    }

    async fn exists(&self, _key: &CacheKey) -> ChirpResult<bool> {
        Err(unreachable_cache())
    }

    async fn incr(&self, _keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        Err(unreachable_cache())
    }

    async fn decr(&self, _keys: &[CacheKey]) -> ChirpResult<Vec<i64>> {
        Err(unreachable_cache())
    }

    async fn sadd_raw(&self, _key: &CacheKey, _members: &[String]) -> ChirpResult<()> {
        Err(unreachable_cache())
    }

    async fn smembers_raw(&self, _key: &CacheKey) -> ChirpResult<Option<Vec<String>>> {
        Err(unreachable_cache())
    }

    async fn sremove_raw(&self, _key: &CacheKey, _members: &[String]) -> ChirpResult<()> {
        Err(unreachable_cache())
    }

    async fn flush(&self) -> ChirpResult<()> {
        Err(unreachable_cache())
    }

    fn is_enabled(&self) -> bool {
        true
    }
}

pub fn settings() -> StorageSettings {
    StorageSettings {
        ttl: Duration::from_secs(300),
        search_ttl: Duration::from_secs(60),
        workers: 4,
    }
}

/// Orchestrators and services over one fake store and one cache.
pub struct Harness {
    pub store: Arc<FakeStore>,
    pub cache: Arc<InMemoryCacheAccessor>,
    pub users: Arc<UserStorageImpl>,
    pub tweets: Arc<TweetStorageImpl>,
}

impl Harness {
    pub fn new() -> Self {
        let store = FakeStore::new();
        let cache = Arc::new(InMemoryCacheAccessor::new());
        let (users, tweets) = storages(&store, cache.clone());
        Self {
            store,
            cache,
            users,
            tweets,
        }
    }

    pub fn tweet_service(&self) -> TweetServiceImpl {
        TweetServiceImpl::new(self.tweets.clone(), self.users.clone())
    }

    pub fn user_service(&self) -> UserServiceImpl {
        UserServiceImpl::new(self.users.clone())
    }
}

/// Builds both orchestrators over `store` and `cache`.
pub fn storages(
    store: &Arc<FakeStore>,
    cache: Arc<dyn CacheAccessor>,
) -> (Arc<UserStorageImpl>, Arc<TweetStorageImpl>) {
    let users = Arc::new(UserStorageImpl::new(
        cache.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        settings(),
    ));
    let tweets = Arc::new(TweetStorageImpl::new(
        cache,
        store.clone(),
        store.clone(),
        store.clone(),
        users.clone(),
        settings(),
    ));
    (users, tweets)
}
