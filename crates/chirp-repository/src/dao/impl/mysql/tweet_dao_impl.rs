//! MySQL implementation of TweetDao.

use crate::dao::TweetDao;
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult, TweetId, TweetRecord, UserId};
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::{FromRow, MySql, QueryBuilder};
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed tweet DAO.
#[derive(Component, Clone)]
#[shaku(interface = TweetDao)]
pub struct MySqlTweetDaoImpl {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlTweetDaoImpl {
    /// Creates a new MySQL tweet DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct TweetRow {
    id: i64,
    author_id: i64,
    content: String,
    created_at: DateTime<Utc>,
}

impl From<TweetRow> for TweetRecord {
    fn from(row: TweetRow) -> Self {
        Self {
            id: TweetId(row.id),
            author_id: UserId(row.author_id),
            content: row.content,
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl TweetDao for MySqlTweetDaoImpl {
    async fn get_tweet_by_id(&self, id: TweetId) -> ChirpResult<Option<TweetRecord>> {
        debug!("DAO: Finding tweet by id: {}", id);

        let row = sqlx::query_as::<_, TweetRow>(
            "SELECT id, author_id, content, created_at FROM tweets WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(TweetRecord::from))
    }

    async fn get_tweets_by_ids(&self, ids: &[TweetId]) -> ChirpResult<Vec<TweetRecord>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        debug!("DAO: Fetching {} tweets by id", ids.len());

        let mut builder: QueryBuilder<MySql> = QueryBuilder::new(
            "SELECT id, author_id, content, created_at FROM tweets WHERE id IN (",
        );
        let mut separated = builder.separated(", ");
        for id in ids {
            separated.push_bind(id.into_inner());
        }
        separated.push_unseparated(")");

        let rows = builder
            .build_query_as::<TweetRow>()
            .fetch_all(self.pool.inner())
            .await?;

        Ok(rows.into_iter().map(TweetRecord::from).collect())
    }

    async fn insert_tweet(&self, author_id: UserId, content: &str) -> ChirpResult<TweetRecord> {
        debug!("DAO: Inserting tweet for author: {}", author_id);

        let result = sqlx::query("INSERT INTO tweets (author_id, content) VALUES (?, ?)")
            .bind(author_id.into_inner())
            .bind(content)
            .execute(self.pool.inner())
            .await?;

        let id = i64::try_from(result.last_insert_id())
            .map(TweetId)
            .map_err(|e| ChirpError::Database(format!("Tweet id out of range: {}", e)))?;

        self.get_tweet_by_id(id)
            .await?
            .ok_or_else(|| ChirpError::internal(format!("Inserted tweet {} not readable", id)))
    }

    async fn delete_tweet(&self, id: TweetId) -> ChirpResult<bool> {
        debug!("DAO: Deleting tweet: {}", id);

        let result = sqlx::query("DELETE FROM tweets WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn get_tweet_ids_by_author_id(&self, author_id: UserId) -> ChirpResult<Vec<TweetId>> {
        debug!("DAO: Listing tweet ids for author: {}", author_id);

        let ids = sqlx::query_scalar::<_, i64>("SELECT id FROM tweets WHERE author_id = ?")
            .bind(author_id.into_inner())
            .fetch_all(self.pool.inner())
            .await?;

        Ok(ids.into_iter().map(TweetId).collect())
    }
}
