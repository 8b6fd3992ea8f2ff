//! TweetDao trait: tweet row access.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, TweetId, TweetRecord, UserId};

/// Low-level tweet data access object.
#[async_trait]
pub trait TweetDao: Interface + Send + Sync {
    /// Finds a tweet by ID. `None` means the row does not exist.
    async fn get_tweet_by_id(&self, id: TweetId) -> ChirpResult<Option<TweetRecord>>;

    /// Fetches every existing tweet among `ids` in one query.
    ///
    /// IDs without a row are skipped; the result order is unspecified.
    async fn get_tweets_by_ids(&self, ids: &[TweetId]) -> ChirpResult<Vec<TweetRecord>>;

    /// Inserts a tweet. The store assigns the ID and creation time.
    async fn insert_tweet(&self, author_id: UserId, content: &str) -> ChirpResult<TweetRecord>;

    /// Deletes a tweet. Returns `true` if a row was removed.
    async fn delete_tweet(&self, id: TweetId) -> ChirpResult<bool>;

    /// Lists the IDs of every tweet written by `author_id`.
    async fn get_tweet_ids_by_author_id(&self, author_id: UserId) -> ChirpResult<Vec<TweetId>>;
}
