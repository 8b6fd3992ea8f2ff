//! MySQL full-text implementation of SearchDao.

use crate::dao::SearchDao;
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use chirp_core::{ChirpResult, TweetId, UserId};
use shaku::Component;
use std::sync::Arc;
use tracing::debug;

/// Upper bound on IDs returned by one search.
const MAX_SEARCH_RESULTS: i64 = 100;

/// MySQL-backed search DAO using `MATCH ... AGAINST` in natural language mode.
#[derive(Component, Clone)]
#[shaku(interface = SearchDao)]
pub struct MySqlSearchDaoImpl {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlSearchDaoImpl {
    /// Creates a new MySQL search DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SearchDao for MySqlSearchDaoImpl {
    async fn get_tweets_ids(&self, query: &str) -> ChirpResult<Vec<TweetId>> {
        debug!("DAO: Searching tweets for: {}", query);

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM tweets
            WHERE MATCH(content) AGAINST (? IN NATURAL LANGUAGE MODE)
            LIMIT ?
            "#,
        )
        .bind(query)
        .bind(MAX_SEARCH_RESULTS)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(ids.into_iter().map(TweetId).collect())
    }

    async fn get_users_ids(&self, query: &str) -> ChirpResult<Vec<UserId>> {
        debug!("DAO: Searching users for: {}", query);

        let ids = sqlx::query_scalar::<_, i64>(
            r#"
            SELECT id FROM users
            WHERE MATCH(username, display_name) AGAINST (? IN NATURAL LANGUAGE MODE)
            LIMIT ?
            "#,
        )
        .bind(query)
        .bind(MAX_SEARCH_RESULTS)
        .fetch_all(self.pool.inner())
        .await?;

        Ok(ids.into_iter().map(UserId).collect())
    }
}
