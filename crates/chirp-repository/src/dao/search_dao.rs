//! SearchDao trait: full-text lookups returning IDs only.

use async_trait::async_trait;
use chirp_core::{ChirpResult, Interface, TweetId, UserId};

/// Full-text search over tweets and users.
#[async_trait]
pub trait SearchDao: Interface + Send + Sync {
    /// IDs of tweets whose content matches `query`.
    async fn get_tweets_ids(&self, query: &str) -> ChirpResult<Vec<TweetId>>;

    /// IDs of users whose username or display name matches `query`.
    async fn get_users_ids(&self, query: &str) -> ChirpResult<Vec<UserId>>;
}
