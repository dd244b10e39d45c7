//! Append-only log of every LID validation attempt, valid or not
//! (spec.md §4.8/§7 — "every early-exit point writes a validation-log row").

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tier3_core::EngineError;
use uuid::Uuid;

use crate::connection::DatabasePool;

pub struct ValidationLogEntry {
    pub occurred_at: DateTime<Utc>,
    pub raw_loyalty_id: String,
    pub normalized_id: Option<String>,
    pub store_id: String,
    pub valid: bool,
    pub is_manager_card: bool,
    pub reason: String,
}

#[async_trait]
pub trait ValidationLogRepository {
    async fn append(&self, entry: &ValidationLogEntry) -> Result<(), EngineError>;
}

pub struct SqlxValidationLogRepository {
    pool: DatabasePool,
}

impl SqlxValidationLogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO loyalty_validation_log
        (id, occurred_at, raw_loyalty_id, normalized_id, store_id, valid, is_manager_card, reason)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
"#;

#[async_trait]
impl ValidationLogRepository for SqlxValidationLogRepository {
    async fn append(&self, entry: &ValidationLogEntry) -> Result<(), EngineError> {
        let id = Uuid::new_v4().to_string();
        match &self.pool {
            DatabasePool::Postgres(pool) => {
                sqlx::query(INSERT_SQL)
                    .bind(&id)
                    .bind(entry.occurred_at)
                    .bind(&entry.raw_loyalty_id)
                    .bind(&entry.normalized_id)
                    .bind(&entry.store_id)
                    .bind(entry.valid)
                    .bind(entry.is_manager_card)
                    .bind(&entry.reason)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("validation log append: {e}")))?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(INSERT_SQL)
                    .bind(&id)
                    .bind(entry.occurred_at)
                    .bind(&entry.raw_loyalty_id)
                    .bind(&entry.normalized_id)
                    .bind(&entry.store_id)
                    .bind(entry.valid)
                    .bind(entry.is_manager_card)
                    .bind(&entry.reason)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("validation log append: {e}")))?;
            }
        }
        Ok(())
    }
}
