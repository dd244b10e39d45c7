//! Persistence facade: connection pooling, per-LID serialization, and the
//! repositories the pipeline needs. Production: PostgreSQL via sqlx; SQLite
//! is used for local development and tests against the same queries.

pub mod connection;
pub mod lock;
pub mod repositories;

use std::sync::Arc;

use connection::DatabasePool;
use lock::LidLocks;
use repositories::{
    AvtRepository, CatalogRepository, DailyCountRepository, ProfileRepository,
    SqlxAvtRepository, SqlxCatalogRepository, SqlxDailyCountRepository, SqlxProfileRepository,
    SqlxTransactionRepository, SqlxValidationLogRepository, TransactionRepository,
    ValidationLogRepository,
};
use tier3_core::EngineError;
use tokio::sync::OwnedMutexGuard;
use tracing::info;

/// Single handle the pipeline depends on: one pool, one set of
/// repositories, and the per-LID lock table. Cheaply `Clone`-able (an
/// `Arc` around every field) so it can be shared across request tasks.
#[derive(Clone)]
pub struct Store {
    pool: DatabasePool,
    lid_locks: Arc<LidLocks>,
    profiles: Arc<dyn ProfileRepository + Send + Sync>,
    daily_counts: Arc<dyn DailyCountRepository + Send + Sync>,
    validation_log: Arc<dyn ValidationLogRepository + Send + Sync>,
    avt: Arc<dyn AvtRepository + Send + Sync>,
    transactions: Arc<dyn TransactionRepository + Send + Sync>,
    catalog: Arc<dyn CatalogRepository + Send + Sync>,
}

impl Store {
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, EngineError> {
        let pool = DatabasePool::connect(database_url, max_connections).await?;
        info!("persistence store ready");
        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: DatabasePool) -> Self {
        Self {
            profiles: Arc::new(SqlxProfileRepository::new(pool.clone())),
            daily_counts: Arc::new(SqlxDailyCountRepository::new(pool.clone())),
            validation_log: Arc::new(SqlxValidationLogRepository::new(pool.clone())),
            avt: Arc::new(SqlxAvtRepository::new(pool.clone())),
            transactions: Arc::new(SqlxTransactionRepository::new(pool.clone())),
            catalog: Arc::new(SqlxCatalogRepository::new(pool.clone())),
            lid_locks: Arc::new(LidLocks::new()),
            pool,
        }
    }

    pub async fn health_check(&self) -> Result<(), EngineError> {
        self.pool.health_check().await
    }

    /// Hold for the duration of the daily-count upsert through the
    /// manager-card decision for this LID (spec.md §5).
    pub async fn lock_lid(&self, normalized_id: &str) -> OwnedMutexGuard<()> {
        self.lid_locks.acquire(normalized_id).await
    }

    pub fn profiles(&self) -> &(dyn ProfileRepository + Send + Sync) {
        self.profiles.as_ref()
    }

    pub fn daily_counts(&self) -> &(dyn DailyCountRepository + Send + Sync) {
        self.daily_counts.as_ref()
    }

    pub fn validation_log(&self) -> &(dyn ValidationLogRepository + Send + Sync) {
        self.validation_log.as_ref()
    }

    pub fn avt(&self) -> &(dyn AvtRepository + Send + Sync) {
        self.avt.as_ref()
    }

    pub fn transactions(&self) -> &(dyn TransactionRepository + Send + Sync) {
        self.transactions.as_ref()
    }

    pub fn catalog(&self) -> &(dyn CatalogRepository + Send + Sync) {
        self.catalog.as_ref()
    }

    /// Raw pool access for seeding the catalog tables this engine only
    /// ever reads (spec.md §1) — used by integration tests and by the
    /// external synchronizer's own migration tooling, never by the
    /// pipeline itself.
    pub fn pool(&self) -> &DatabasePool {
        &self.pool
    }
}
