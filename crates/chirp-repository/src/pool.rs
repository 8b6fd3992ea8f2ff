//! Shared MySQL pool behind every Chirp DAO.

use async_trait::async_trait;
use chirp_config::DatabaseConfig;
use chirp_core::{ChirpError, ChirpResult, Interface};
use shaku::Component;
use sqlx::mysql::{MySqlConnectOptions, MySqlPool, MySqlPoolOptions};
use sqlx::ConnectOptions;
use std::str::FromStr;
use tracing::{info, warn};

/// Connection source for the tweet, user, follow, like and search DAOs.
#[async_trait]
pub trait DatabasePoolInterface: Interface + Send + Sync {
    fn inner(&self) -> &MySqlPool;

    /// Round-trips a trivial query.
    async fn health_check(&self) -> ChirpResult<()>;

    /// Applies the users/tweets/follows/likes schema from `migrations/`.
    async fn run_migrations(&self) -> ChirpResult<()>;

    async fn close(&self);
}

/// Shaku component owning the MySQL pool.
#[derive(Component)]
#[shaku(interface = DatabasePoolInterface)]
pub struct DatabasePool {
    pool: MySqlPool,
}

/// Parses the configured URL. Per-statement logging is off unless
/// `log_queries` is set.
pub fn connect_options(config: &DatabaseConfig) -> ChirpResult<MySqlConnectOptions> {
    let options = MySqlConnectOptions::from_str(&config.url)
        .map_err(|e| ChirpError::Configuration(format!("Invalid database URL: {}", e)))?;
    Ok(if config.log_queries {
        options
    } else {
        options.disable_statement_logging()
    })
}

impl DatabasePool {
    pub async fn connect(config: &DatabaseConfig) -> ChirpResult<Self> {
        let options = connect_options(config)?;
        info!(
            host = options.get_host(),
            database = options.get_database().unwrap_or_default(),
            max_connections = config.max_connections,
            "Connecting Chirp store"
        );

        let pool = MySqlPoolOptions::new()
            .min_connections(config.min_connections)
            .max_connections(config.max_connections)
            .acquire_timeout(config.connect_timeout())
            .idle_timeout(Some(config.idle_timeout()))
            .connect_with(options)
            .await
            .map_err(|e| {
                warn!("Chirp store unreachable: {}", e);
                ChirpError::Database(format!("Failed to connect: {}", e))
            })?;

        Ok(Self { pool })
    }
}

#[async_trait]
impl DatabasePoolInterface for DatabasePool {
    fn inner(&self) -> &MySqlPool {
        &self.pool
    }

    async fn health_check(&self) -> ChirpResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| ChirpError::Database(format!("Health check failed: {}", e)))?;
        Ok(())
    }

    async fn run_migrations(&self) -> ChirpResult<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| ChirpError::Database(format!("Migration failed: {}", e)))?;
        info!("Chirp schema up to date");
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        info!("Chirp store pool closed");
    }
}

impl std::fmt::Debug for DatabasePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DatabasePool")
            .field("size", &self.pool.size())
            .field("num_idle", &self.pool.num_idle())
            .finish()
    }
}
