//! MySQL implementation of LikeDao.

use crate::dao::LikeDao;
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use chirp_core::{ChirpResult, TweetId, UserId};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed like DAO.
#[derive(Component, Clone)]
#[shaku(interface = LikeDao)]
pub struct MySqlLikeDaoImpl {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlLikeDaoImpl {
    /// Creates a new MySQL like DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LikeDao for MySqlLikeDaoImpl {
    async fn like_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        debug!("DAO: User {} likes tweet {}", user_id, tweet_id);

        let result = sqlx::query("INSERT IGNORE INTO likes (tweet_id, user_id) VALUES (?, ?)")
            .bind(tweet_id.into_inner())
            .bind(user_id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn unlike_tweet(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        debug!("DAO: User {} unlikes tweet {}", user_id, tweet_id);

        let result = sqlx::query("DELETE FROM likes WHERE tweet_id = ? AND user_id = ?")
            .bind(tweet_id.into_inner())
            .bind(user_id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_like_count(&self, tweet_id: TweetId) -> ChirpResult<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM likes WHERE tweet_id = ?")
                .bind(tweet_id.into_inner())
                .fetch_one(self.pool.inner())
                .await?;

        Ok(count)
    }

    async fn is_liked(&self, tweet_id: TweetId, user_id: UserId) -> ChirpResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM likes WHERE tweet_id = ? AND user_id = ?",
        )
        .bind(tweet_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(self.pool.inner())
        .await?;

        Ok(count > 0)
    }
}
