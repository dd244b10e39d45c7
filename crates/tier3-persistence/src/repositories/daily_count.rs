//! Atomic `(normalized_id, date)` increment returning the post-increment
//! count. The cap check in S1 depends on observing the *returned* value,
//! not a subsequent read (spec.md §4.1 step 4, §9 "Manager-card race").

use async_trait::async_trait;
use chrono::NaiveDate;
use tier3_core::EngineError;

use crate::connection::DatabasePool;

#[async_trait]
pub trait DailyCountRepository {
    async fn increment_and_get(
        &self,
        normalized_id: &str,
        date: NaiveDate,
    ) -> Result<i64, EngineError>;
}

pub struct SqlxDailyCountRepository {
    pool: DatabasePool,
}

impl SqlxDailyCountRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const UPSERT_SQL: &str = r#"
    INSERT INTO daily_transaction_counts (normalized_id, count_date, tx_count)
    VALUES ($1, $2, 1)
    ON CONFLICT (normalized_id, count_date)
    DO UPDATE SET tx_count = daily_transaction_counts.tx_count + 1
    RETURNING tx_count
"#;

#[async_trait]
impl DailyCountRepository for SqlxDailyCountRepository {
    async fn increment_and_get(
        &self,
        normalized_id: &str,
        date: NaiveDate,
    ) -> Result<i64, EngineError> {
        let count: i64 = match &self.pool {
            DatabasePool::Postgres(pool) => sqlx::query_scalar(UPSERT_SQL)
                .bind(normalized_id)
                .bind(date)
                .fetch_one(pool)
                .await
                .map_err(|e| EngineError::Database(format!("daily count upsert: {e}")))?,
            DatabasePool::Sqlite(pool) => sqlx::query_scalar(UPSERT_SQL)
                .bind(normalized_id)
                .bind(date)
                .fetch_one(pool)
                .await
                .map_err(|e| EngineError::Database(format!("daily count upsert: {e}")))?,
        };
        Ok(count)
    }
}
