//! Connection pooling for both PostgreSQL (production) and SQLite
//! (local/dev/tests), mirroring the dual-backend pattern used elsewhere
//! in this codebase's ancestry for wallet/account storage.

use sqlx::postgres::PgPoolOptions;
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Pool, Postgres, Sqlite};
use std::time::Duration;
use tier3_core::EngineError;
use tracing::info;

#[derive(Clone)]
pub enum DatabasePool {
    Postgres(Pool<Postgres>),
    Sqlite(Pool<Sqlite>),
}

impl DatabasePool {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, EngineError> {
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            Self::new_postgres(database_url, max_connections).await
        } else {
            Self::new_sqlite(database_url, max_connections).await
        }
    }

    pub async fn new_postgres(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, EngineError> {
        info!(max_connections, "connecting to PostgreSQL");
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| EngineError::Database(format!("postgres connect failed: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| EngineError::Database(format!("postgres migration failed: {e}")))?;

        Ok(DatabasePool::Postgres(pool))
    }

    pub async fn new_sqlite(
        database_url: &str,
        max_connections: u32,
    ) -> Result<Self, EngineError> {
        info!(max_connections, "connecting to SQLite");
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .acquire_timeout(Duration::from_secs(10))
            .connect(database_url)
            .await
            .map_err(|e| EngineError::Database(format!("sqlite connect failed: {e}")))?;

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| EngineError::Database(format!("sqlite migration failed: {e}")))?;

        Ok(DatabasePool::Sqlite(pool))
    }

    pub async fn health_check(&self) -> Result<(), EngineError> {
        match self {
            DatabasePool::Postgres(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("postgres health check: {e}")))?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query("SELECT 1")
                    .fetch_one(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("sqlite health check: {e}")))?;
            }
        }
        Ok(())
    }
}
