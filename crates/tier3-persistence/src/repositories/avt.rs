//! Append-only age-verification audit trail. Writes here are fatal on
//! failure — they are legally required (spec.md §4.2/§7).

use async_trait::async_trait;
use tier3_core::avt::AvtRecord;
use tier3_core::EngineError;
use uuid::Uuid;

use crate::connection::DatabasePool;

#[async_trait]
pub trait AvtRepository {
    async fn append(&self, record: &AvtRecord) -> Result<(), EngineError>;
}

pub struct SqlxAvtRepository {
    pool: DatabasePool,
}

impl SqlxAvtRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const INSERT_SQL: &str = r#"
    INSERT INTO avt_transactions
        (id, transaction_id, store_id, loyalty_id, cid_customer_id, avt_performed,
         avt_method, avt_timestamp, cashier_id, eaiv_verified)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

#[async_trait]
impl AvtRepository for SqlxAvtRepository {
    async fn append(&self, record: &AvtRecord) -> Result<(), EngineError> {
        let id = Uuid::new_v4().to_string();
        match &self.pool {
            DatabasePool::Postgres(pool) => {
                sqlx::query(INSERT_SQL)
                    .bind(&id)
                    .bind(&record.transaction_id)
                    .bind(&record.store_id)
                    .bind(&record.loyalty_id)
                    .bind(&record.cid_customer_id)
                    .bind(record.avt_performed)
                    .bind(&record.avt_method)
                    .bind(record.avt_timestamp)
                    .bind(&record.cashier_id)
                    .bind(record.eaiv_verified)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::AvtWriteFailed(e.to_string()))?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(INSERT_SQL)
                    .bind(&id)
                    .bind(&record.transaction_id)
                    .bind(&record.store_id)
                    .bind(&record.loyalty_id)
                    .bind(&record.cid_customer_id)
                    .bind(record.avt_performed)
                    .bind(&record.avt_method)
                    .bind(record.avt_timestamp)
                    .bind(&record.cashier_id)
                    .bind(record.eaiv_verified)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::AvtWriteFailed(e.to_string()))?;
            }
        }
        Ok(())
    }
}
