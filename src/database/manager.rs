use std::future::Future;
use std::time::Duration;

use sqlx::{postgres::PgPoolOptions, PgPool};
use thiserror::Error;
use tracing::info;

use crate::config;

/// Errors from the persistence layer
#[derive(Debug, Error)]
pub enum DatabaseError {
    #[error("Missing configuration: {0}")]
    ConfigMissing(&'static str),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate value violates {0}")]
    DuplicateKey(String),

    #[error("Query error: {0}")]
    QueryError(String),

    #[error("Query exceeded deadline of {0}ms")]
    Timeout(u64),

    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error(transparent)]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error(transparent)]
    Sqlx(sqlx::Error),
}

impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => DatabaseError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                DatabaseError::DuplicateKey(db_err.constraint().unwrap_or("unique constraint").to_string())
            }
            e @ (sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) | sqlx::Error::Tls(_)) => {
                DatabaseError::ConnectionError(e.to_string())
            }
            other => DatabaseError::Sqlx(other),
        }
    }
}

/// Builds and checks the shared connection pool
pub struct DatabaseManager;

impl DatabaseManager {
    /// Connect using DATABASE_URL and the database section of the config
    pub async fn connect() -> Result<PgPool, DatabaseError> {
        let url = Self::database_url()?;
        let cfg = &config::config().database;

        let pool = Self::pool_options().connect(&url).await?;
        info!("Connected database pool (max_connections={})", cfg.max_connections);
        Ok(pool)
    }

    /// A pool that opens connections on first use
    pub fn connect_lazy(url: &str) -> Result<PgPool, DatabaseError> {
        Ok(Self::pool_options().connect_lazy(url)?)
    }

    fn pool_options() -> PgPoolOptions {
        let cfg = &config::config().database;
        PgPoolOptions::new()
            .max_connections(cfg.max_connections)
            .acquire_timeout(Duration::from_secs(cfg.connection_timeout))
    }

    fn database_url() -> Result<String, DatabaseError> {
        std::env::var("DATABASE_URL").map_err(|_| DatabaseError::ConfigMissing("DATABASE_URL"))
    }

    /// Apply the SQL migrations embedded from `migrations/`
    pub async fn migrate(pool: &PgPool) -> Result<(), DatabaseError> {
        sqlx::migrate!("./migrations").run(pool).await?;
        info!("Database migrations applied");
        Ok(())
    }

    /// Pings the pool to ensure connectivity
    pub async fn health_check(pool: &PgPool) -> Result<(), DatabaseError> {
        with_deadline(async {
            sqlx::query("SELECT 1").execute(pool).await?;
            Ok::<_, DatabaseError>(())
        })
        .await
    }

    pub async fn close(pool: &PgPool) {
        pool.close().await;
        info!("Closed database pool");
    }
}

/// Bound a persistence call by the configured per-request query deadline
pub async fn with_deadline<F, T>(fut: F) -> Result<T, DatabaseError>
where
    F: Future<Output = Result<T, DatabaseError>>,
{
    let ms = config::config().database.query_timeout_ms;
    match tokio::time::timeout(Duration::from_millis(ms), fut).await {
        Ok(result) => result,
        Err(_) => {
            tracing::warn!("Database call exceeded {}ms deadline", ms);
            Err(DatabaseError::Timeout(ms))
        }
    }
}
