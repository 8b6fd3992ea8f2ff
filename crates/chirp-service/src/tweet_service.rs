//! Tweet service trait definition.

use crate::dto::CreateTweetRequest;
use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, Tweet, TweetId, UserId};

/// Maximum number of tweets a home feed returns.
pub const MAX_FEED_LIMIT: usize = 200;

/// Tweet service trait.
///
/// Lists come back newest first.
#[async_trait]
pub trait TweetService: Interface + Send + Sync {
    /// Posts a tweet as `author_id`.
    async fn create_tweet(
        &self,
        author_id: UserId,
        request: CreateTweetRequest,
    ) -> ChirpResult<Tweet>;

    /// Gets a tweet as seen by `viewer`.
    async fn get_tweet(&self, id: TweetId, viewer: Option<UserId>) -> ChirpResult<Tweet>;

    /// Deletes a tweet. Only its author may do so.
    async fn delete_tweet(&self, id: TweetId, requester: UserId) -> ChirpResult<()>;

    /// Likes a tweet.
    async fn like_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()>;

    /// Withdraws a like.
    async fn unlike_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()>;

    /// Lists a user's tweets.
    async fn get_user_tweets(
        &self,
        author_id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>>;

    /// Searches tweets by content.
    async fn search_tweets(&self, query: &str, viewer: Option<UserId>) -> ChirpResult<Vec<Tweet>>;

    /// The viewer's own tweets and those of everyone they follow, up to `limit`.
    async fn get_home_feed(&self, viewer: UserId, limit: usize) -> ChirpResult<Vec<Tweet>>;
}
