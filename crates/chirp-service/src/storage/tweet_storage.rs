//! Tweet storage trait definition.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, Tweet, TweetId, UserId};

/// Cache-aside access to tweets and likes.
///
/// `viewer` is the user the result is hydrated for; `None` is an anonymous
/// viewer, who never likes anything. Collection results come back in no
/// particular order.
#[async_trait]
pub trait TweetStorage: Interface + Send + Sync {
    /// Stores a new tweet and returns it hydrated for its author.
    async fn insert_tweet(&self, author_id: UserId, content: &str) -> ChirpResult<Tweet>;

    /// Gets a tweet by ID.
    async fn get_tweet(&self, id: TweetId, viewer: Option<UserId>) -> ChirpResult<Tweet>;

    /// Gets every existing tweet among `ids`. Unknown IDs are skipped.
    async fn get_tweets_by_ids(
        &self,
        ids: &[TweetId],
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>>;

    /// Gets every tweet written by `author_id`.
    async fn get_tweets_by_author(
        &self,
        author_id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>>;

    /// Full-text search over tweet content.
    async fn search_tweets(&self, query: &str, viewer: Option<UserId>) -> ChirpResult<Vec<Tweet>>;

    /// Deletes a tweet from the store and the cache.
    async fn delete_tweet(&self, id: TweetId) -> ChirpResult<()>;

    /// Records that `viewer` likes tweet `id`. Liking twice is a no-op.
    async fn like_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()>;

    /// Withdraws `viewer`'s like. Unliking an unliked tweet is a no-op.
    async fn unlike_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()>;
}
