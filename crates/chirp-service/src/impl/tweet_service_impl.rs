//! Tweet service implementation.

use crate::dto::CreateTweetRequest;
use crate::storage::{TweetStorage, UserStorage};
use crate::tweet_service::{TweetService, MAX_FEED_LIMIT};
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult, Tweet, TweetId, UserId, ValidateExt};
use shaku::Component;
use std::cmp::Reverse;
use std::sync::Arc;
use tracing::{debug, info};

fn newest_first(tweets: &mut [Tweet]) {
    tweets.sort_by_key(|t| Reverse((t.created_at, t.id)));
}

fn normalize_query(query: &str) -> ChirpResult<&str> {
    let query = query.trim();
    if query.is_empty() {
        return Err(ChirpError::validation("Search query cannot be empty"));
    }
    Ok(query)
}

/// Tweet service component.
#[derive(Component)]
#[shaku(interface = TweetService)]
pub struct TweetServiceImpl {
    #[shaku(inject)]
    tweet_storage: Arc<dyn TweetStorage>,
    #[shaku(inject)]
    user_storage: Arc<dyn UserStorage>,
}

impl TweetServiceImpl {
    /// Creates a new tweet service.
    #[must_use]
    pub fn new(tweet_storage: Arc<dyn TweetStorage>, user_storage: Arc<dyn UserStorage>) -> Self {
        Self {
            tweet_storage,
            user_storage,
        }
    }
}

#[async_trait]
impl TweetService for TweetServiceImpl {
    async fn create_tweet(
        &self,
        author_id: UserId,
        request: CreateTweetRequest,
    ) -> ChirpResult<Tweet> {
        debug!("Creating tweet for: {}", author_id);
        request.validate_request()?;
        self.tweet_storage
            .insert_tweet(author_id, &request.content)
            .await
    }

    async fn get_tweet(&self, id: TweetId, viewer: Option<UserId>) -> ChirpResult<Tweet> {
        self.tweet_storage.get_tweet(id, viewer).await
    }

    async fn delete_tweet(&self, id: TweetId, requester: UserId) -> ChirpResult<()> {
        let tweet = self.tweet_storage.get_tweet(id, Some(requester)).await?;
        if tweet.author_id() != requester {
            return Err(ChirpError::forbidden(format!(
                "User {} cannot delete tweet {}",
                requester, id
            )));
        }

        self.tweet_storage.delete_tweet(id).await?;
        info!("Tweet {} deleted by its author", id);
        Ok(())
    }

    async fn like_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()> {
        self.tweet_storage.like_tweet(id, viewer).await
    }

    async fn unlike_tweet(&self, id: TweetId, viewer: UserId) -> ChirpResult<()> {
        self.tweet_storage.unlike_tweet(id, viewer).await
    }

    async fn get_user_tweets(
        &self,
        author_id: UserId,
        viewer: Option<UserId>,
    ) -> ChirpResult<Vec<Tweet>> {
        self.user_storage.get_user_by_id(author_id, None).await?;

        let mut tweets = self
            .tweet_storage
            .get_tweets_by_author(author_id, viewer)
            .await?;
        newest_first(&mut tweets);
        Ok(tweets)
    }

    async fn search_tweets(&self, query: &str, viewer: Option<UserId>) -> ChirpResult<Vec<Tweet>> {
        let query = normalize_query(query)?;
        let mut tweets = self.tweet_storage.search_tweets(query, viewer).await?;
        newest_first(&mut tweets);
        Ok(tweets)
    }

    async fn get_home_feed(&self, viewer: UserId, limit: usize) -> ChirpResult<Vec<Tweet>> {
        if limit == 0 || limit > MAX_FEED_LIMIT {
            return Err(ChirpError::validation(format!(
                "Feed limit must be between 1 and {}",
                MAX_FEED_LIMIT
            )));
        }

        let mut authors = self.user_storage.get_followee_ids(viewer).await?;
        authors.push(viewer);
        debug!("Building home feed for {} from {} authors", viewer, authors.len());

        let mut feed = Vec::new();
        for author in authors {
            let tweets = self
                .tweet_storage
                .get_tweets_by_author(author, Some(viewer))
                .await?;
            feed.extend(tweets);
        }

        newest_first(&mut feed);
        feed.truncate(limit);
        Ok(feed)
    }
}

impl std::fmt::Debug for TweetServiceImpl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TweetServiceImpl").finish_non_exhaustive()
    }
}
