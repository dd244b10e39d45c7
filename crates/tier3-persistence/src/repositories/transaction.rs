//! Transaction + transaction-line append, the last durable write phase
//! (spec.md §4.8/§5). Written inside a single database transaction so a
//! cancelled request never leaves a half-written transaction row: either
//! all lines commit alongside the header, or none do.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tier3_core::basket::PricedLine;
use tier3_core::EngineError;

use crate::connection::DatabasePool;

pub struct TransactionSummary {
    pub transaction_id: String,
    pub store_id: String,
    pub cashier_id: Option<String>,
    pub normalized_id: Option<String>,
    pub tier3_eligible: bool,
    pub cid_fund_eligible: bool,
    pub age_verified: bool,
    pub eaiv_verified: bool,
    pub total_discount: Decimal,
    pub created_at: DateTime<Utc>,
}

#[async_trait]
pub trait TransactionRepository {
    async fn append(
        &self,
        summary: &TransactionSummary,
        lines: &[PricedLine],
    ) -> Result<(), EngineError>;
}

pub struct SqlxTransactionRepository {
    pool: DatabasePool,
}

impl SqlxTransactionRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

const INSERT_TX_SQL: &str = r#"
    INSERT INTO transactions
        (transaction_id, store_id, cashier_id, normalized_id, tier3_eligible,
         cid_fund_eligible, age_verified, eaiv_verified, total_discount, created_at)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
"#;

const INSERT_LINE_SQL: &str = r#"
    INSERT INTO transaction_lines
        (transaction_id, line_number, upc, skuguid, quantity, unit_price,
         total_discount, final_unit_price, final_extended_price)
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
"#;

#[async_trait]
impl TransactionRepository for SqlxTransactionRepository {
    async fn append(
        &self,
        summary: &TransactionSummary,
        lines: &[PricedLine],
    ) -> Result<(), EngineError> {
        match &self.pool {
            DatabasePool::Postgres(pool) => {
                let mut tx = pool
                    .begin()
                    .await
                    .map_err(|e| EngineError::Database(format!("begin tx: {e}")))?;
                sqlx::query(INSERT_TX_SQL)
                    .bind(&summary.transaction_id)
                    .bind(&summary.store_id)
                    .bind(&summary.cashier_id)
                    .bind(&summary.normalized_id)
                    .bind(summary.tier3_eligible)
                    .bind(summary.cid_fund_eligible)
                    .bind(summary.age_verified)
                    .bind(summary.eaiv_verified)
                    .bind(summary.total_discount)
                    .bind(summary.created_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| EngineError::Database(format!("transaction insert: {e}")))?;
                for line in lines {
                    sqlx::query(INSERT_LINE_SQL)
                        .bind(&summary.transaction_id)
                        .bind(line.line.line_number)
                        .bind(&line.line.upc)
                        .bind(&line.line.skuguid)
                        .bind(line.line.quantity)
                        .bind(line.line.unit_price)
                        .bind(line.total_discount)
                        .bind(line.final_unit_price)
                        .bind(line.final_extended_price)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| EngineError::Database(format!("line insert: {e}")))?;
                }
                tx.commit()
                    .await
                    .map_err(|e| EngineError::Database(format!("commit tx: {e}")))?;
            }
            DatabasePool::Sqlite(pool) => {
                let mut tx = pool
                    .begin()
                    .await
                    .map_err(|e| EngineError::Database(format!("begin tx: {e}")))?;
                sqlx::query(INSERT_TX_SQL)
                    .bind(&summary.transaction_id)
                    .bind(&summary.store_id)
                    .bind(&summary.cashier_id)
                    .bind(&summary.normalized_id)
                    .bind(summary.tier3_eligible)
                    .bind(summary.cid_fund_eligible)
                    .bind(summary.age_verified)
                    .bind(summary.eaiv_verified)
                    .bind(summary.total_discount)
                    .bind(summary.created_at)
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| EngineError::Database(format!("transaction insert: {e}")))?;
                for line in lines {
                    sqlx::query(INSERT_LINE_SQL)
                        .bind(&summary.transaction_id)
                        .bind(line.line.line_number)
                        .bind(&line.line.upc)
                        .bind(&line.line.skuguid)
                        .bind(line.line.quantity)
                        .bind(line.line.unit_price)
                        .bind(line.total_discount)
                        .bind(line.final_unit_price)
                        .bind(line.final_extended_price)
                        .execute(&mut *tx)
                        .await
                        .map_err(|e| EngineError::Database(format!("line insert: {e}")))?;
                }
                tx.commit()
                    .await
                    .map_err(|e| EngineError::Database(format!("commit tx: {e}")))?;
            }
        }
        Ok(())
    }
}
