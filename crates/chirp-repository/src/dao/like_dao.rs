//! LikeDao trait: the (tweet, user) like relation.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, TweetId, UserId};

/// Like edge data access object.
#[async_trait]
pub trait LikeDao: Interface + Send + Sync {
    /// Adds the like edge. Returns `true` only if it did not exist before.
    async fn like_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool>;

    /// Removes the like edge. Returns `true` only if it existed.
    async fn unlike_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool>;

    /// Counts the likes on a tweet.
    async fn get_like_count(&self, tweet_id: TweetId) -> ChirpResult<i64>;

    /// Checks whether `user_id` likes `tweet_id`.
    async fn is_liked(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool>;
}
