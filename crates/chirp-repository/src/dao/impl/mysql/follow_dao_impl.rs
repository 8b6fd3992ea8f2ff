//! MySQL implementation of FollowDao.

use crate::dao::FollowDao;
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use chirp_core::{ChirpResult, UserId};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed follow DAO.
#[derive(Component, Clone)]
#[shaku(interface = FollowDao)]
pub struct MySqlFollowDaoImpl {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlFollowDaoImpl {
    /// Creates a new MySQL follow DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }

    async fn count(&self, sql: &str, user_id: UserId) -> ChirpResult<i64> {
        let count = sqlx::query_scalar::<_, i64>(sql)
            .bind(user_id.into_inner())
            .fetch_one(self.pool.inner())
            .await?;
        Ok(count)
    }

    async fn ids(&self, sql: &str, user_id: UserId) -> ChirpResult<Vec<UserId>> {
        let ids = sqlx::query_scalar::<_, i64>(sql)
            .bind(user_id.into_inner())
            .fetch_all(self.pool.inner())
            .await?;
        Ok(ids.into_iter().map(UserId).collect())
    }
}

#[async_trait]
impl FollowDao for MySqlFollowDaoImpl {
    async fn follow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        debug!("DAO: User {} follows {}", follower_id, followee_id);

        let result =
            sqlx::query("INSERT IGNORE INTO follows (followee_id, follower_id) VALUES (?, ?)")
                .bind(followee_id.into_inner())
                .bind(follower_id.into_inner())
                .execute(self.pool.inner())
                .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn unfollow_user(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        debug!("DAO: User {} unfollows {}", follower_id, followee_id);

        let result = sqlx::query("DELETE FROM follows WHERE followee_id = ? AND follower_id = ?")
            .bind(followee_id.into_inner())
            .bind(follower_id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn get_followers_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>> {
        self.ids(
            "SELECT follower_id FROM follows WHERE followee_id = ?",
            user_id,
        )
        .await
    }

    async fn get_followees_ids(&self, user_id: UserId) -> ChirpResult<Vec<UserId>> {
        self.ids(
            "SELECT followee_id FROM follows WHERE follower_id = ?",
            user_id,
        )
        .await
    }

    async fn get_follower_count(&self, user_id: UserId) -> ChirpResult<i64> {
        self.count("SELECT COUNT(*) FROM follows WHERE followee_id = ?", user_id)
            .await
    }

    async fn get_followee_count(&self, user_id: UserId) -> ChirpResult<i64> {
        self.count("SELECT COUNT(*) FROM follows WHERE follower_id = ?", user_id)
            .await
    }

    async fn is_following(&self, followee_id: UserId, follower_id: UserId) -> ChirpResult<bool> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM follows WHERE followee_id = ? AND follower_id = ?",
        )
        .bind(followee_id.into_inner())
        .bind(follower_id.into_inner())
        .fetch_one(self.pool.inner())
        .await?;

        Ok(count > 0)
    }
}
