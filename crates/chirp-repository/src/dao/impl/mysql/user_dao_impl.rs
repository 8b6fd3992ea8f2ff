//! MySQL implementation of UserDao.

use crate::dao::UserDao;
use crate::DatabasePoolInterface;
use async_trait::async_trait;
use chirp_core::{ChirpError, ChirpResult, NewUser, User, UserId, UserProfile};
use chrono::{DateTime, Utc};
use shaku::Component;
use sqlx::FromRow;
use std::sync::Arc;
use tracing::debug;

/// MySQL-backed user DAO.
#[derive(Component, Clone)]
#[shaku(interface = UserDao)]
pub struct MySqlUserDaoImpl {
    #[shaku(inject)]
    pool: Arc<dyn DatabasePoolInterface>,
}

impl MySqlUserDaoImpl {
    /// Creates a new MySQL user DAO.
    #[must_use]
    pub fn new(pool: Arc<dyn DatabasePoolInterface>) -> Self {
        Self { pool }
    }
}

#[derive(Debug, FromRow)]
struct ProfileRow {
    id: i64,
    username: String,
    display_name: String,
    avatar_url: Option<String>,
}

impl From<ProfileRow> for UserProfile {
    fn from(row: ProfileRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
        }
    }
}

#[derive(Debug, FromRow)]
struct UserRow {
    id: i64,
    username: String,
    email: String,
    display_name: String,
    avatar_url: Option<String>,
    password_hash: String,
    created_at: DateTime<Utc>,
    last_login_at: Option<DateTime<Utc>>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId(row.id),
            username: row.username,
            email: row.email,
            display_name: row.display_name,
            avatar_url: row.avatar_url,
            password_hash: row.password_hash,
            created_at: row.created_at,
            last_login_at: row.last_login_at,
        }
    }
}

const USER_COLUMNS: &str =
    "id, username, email, display_name, avatar_url, password_hash, created_at, last_login_at";

#[async_trait]
impl UserDao for MySqlUserDaoImpl {
    async fn get_public_user_by_id(&self, id: UserId) -> ChirpResult<Option<UserProfile>> {
        debug!("DAO: Finding public user by id: {}", id);

        let row = sqlx::query_as::<_, ProfileRow>(
            "SELECT id, username, display_name, avatar_url FROM users WHERE id = ?",
        )
        .bind(id.into_inner())
        .fetch_optional(self.pool.inner())
        .await?;

        Ok(row.map(UserProfile::from))
    }

    async fn get_user_by_email(&self, email: &str) -> ChirpResult<Option<User>> {
        debug!("DAO: Finding user by email");

        let sql = format!("SELECT {} FROM users WHERE email = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(email)
            .fetch_optional(self.pool.inner())
            .await?;

        Ok(row.map(User::from))
    }

    async fn insert_user(&self, user: &NewUser) -> ChirpResult<User> {
        debug!("DAO: Inserting user: {}", user.username);

        let result = sqlx::query(
            r#"
            INSERT INTO users (username, email, display_name, avatar_url, password_hash)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.display_name)
        .bind(&user.avatar_url)
        .bind(&user.password_hash)
        .execute(self.pool.inner())
        .await?;

        let id = i64::try_from(result.last_insert_id())
            .map_err(|e| ChirpError::Database(format!("User id out of range: {}", e)))?;

        let sql = format!("SELECT {} FROM users WHERE id = ?", USER_COLUMNS);
        let row = sqlx::query_as::<_, UserRow>(&sql)
            .bind(id)
            .fetch_one(self.pool.inner())
            .await?;

        Ok(User::from(row))
    }

    async fn update_user_last_login_time(&self, id: UserId) -> ChirpResult<()> {
        debug!("DAO: Updating last login time for user: {}", id);

        let result = sqlx::query("UPDATE users SET last_login_at = CURRENT_TIMESTAMP WHERE id = ?")
            .bind(id.into_inner())
            .execute(self.pool.inner())
            .await?;

        if result.rows_affected() == 0 {
            return Err(ChirpError::not_found("User", id));
        }

        Ok(())
    }
}
