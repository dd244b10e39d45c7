//! Customer profile upsert. Inserts set `first_seen`/`cid_customer_id`/
//! `format_type`; updates only ever touch `last_seen`, increment
//! `total_transactions`, and optionally set `is_manager_card` — spec.md
//! §3/§4.8. `first_seen` and `cid_customer_id` never change after insert.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tier3_core::customer::CustomerProfile;
use tier3_core::lid::FormatType;
use tier3_core::EngineError;
use uuid::Uuid;

use crate::connection::DatabasePool;

#[async_trait]
pub trait ProfileRepository {
    async fn get(&self, normalized_id: &str) -> Result<Option<CustomerProfile>, EngineError>;

    /// Insert on first sighting, else update `last_seen` / bump
    /// `total_transactions` / optionally flip `is_manager_card`. Returns
    /// the resulting profile.
    async fn upsert_seen(
        &self,
        normalized_id: &str,
        store_id: &str,
        format_type: FormatType,
        is_manager_card: bool,
        seen_at: DateTime<Utc>,
    ) -> Result<CustomerProfile, EngineError>;
}

pub struct SqlxProfileRepository {
    pool: DatabasePool,
}

impl SqlxProfileRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

fn row_to_profile(row: ProfileRow) -> CustomerProfile {
    CustomerProfile {
        normalized_id: row.normalized_id,
        first_seen: row.first_seen,
        last_seen: row.last_seen,
        total_transactions: row.total_transactions,
        is_manager_card: row.is_manager_card,
        store_id: row.store_id,
        format_type: if row.format_type == "QR_CODE" {
            FormatType::QrCode
        } else {
            FormatType::PhoneNumber
        },
        cid_customer_id: row.cid_customer_id,
        avt_verified: row.avt_verified,
        eaiv_verified: row.eaiv_verified,
        last_avt_verified: row.last_avt_verified,
        last_eaiv_verified: row.last_eaiv_verified,
    }
}

#[derive(sqlx::FromRow)]
struct ProfileRow {
    normalized_id: String,
    first_seen: DateTime<Utc>,
    last_seen: DateTime<Utc>,
    total_transactions: i64,
    is_manager_card: bool,
    store_id: String,
    format_type: String,
    cid_customer_id: String,
    avt_verified: bool,
    eaiv_verified: bool,
    last_avt_verified: Option<DateTime<Utc>>,
    last_eaiv_verified: Option<DateTime<Utc>>,
}

const SELECT_SQL: &str = r#"
    SELECT normalized_id, first_seen, last_seen, total_transactions, is_manager_card,
           store_id, format_type, cid_customer_id, avt_verified, eaiv_verified,
           last_avt_verified, last_eaiv_verified
    FROM customer_profiles WHERE normalized_id = $1
"#;

#[async_trait]
impl ProfileRepository for SqlxProfileRepository {
    async fn get(&self, normalized_id: &str) -> Result<Option<CustomerProfile>, EngineError> {
        let row: Option<ProfileRow> = match &self.pool {
            DatabasePool::Postgres(pool) => sqlx::query_as(SELECT_SQL)
                .bind(normalized_id)
                .fetch_optional(pool)
                .await
                .map_err(|e| EngineError::Database(format!("profile fetch failed: {e}")))?,
            DatabasePool::Sqlite(pool) => sqlx::query_as(SELECT_SQL)
                .bind(normalized_id)
                .fetch_optional(pool)
                .await
                .map_err(|e| EngineError::Database(format!("profile fetch failed: {e}")))?,
        };
        Ok(row.map(row_to_profile))
    }

    async fn upsert_seen(
        &self,
        normalized_id: &str,
        store_id: &str,
        format_type: FormatType,
        is_manager_card: bool,
        seen_at: DateTime<Utc>,
    ) -> Result<CustomerProfile, EngineError> {
        if let Some(existing) = self.get(normalized_id).await? {
            let update_sql = r#"
                UPDATE customer_profiles
                SET last_seen = $2,
                    total_transactions = total_transactions + 1,
                    is_manager_card = is_manager_card OR $3
                WHERE normalized_id = $1
            "#;
            match &self.pool {
                DatabasePool::Postgres(pool) => {
                    sqlx::query(update_sql)
                        .bind(normalized_id)
                        .bind(seen_at)
                        .bind(is_manager_card)
                        .execute(pool)
                        .await
                        .map_err(|e| EngineError::Database(format!("profile update: {e}")))?;
                }
                DatabasePool::Sqlite(pool) => {
                    sqlx::query(update_sql)
                        .bind(normalized_id)
                        .bind(seen_at)
                        .bind(is_manager_card)
                        .execute(pool)
                        .await
                        .map_err(|e| EngineError::Database(format!("profile update: {e}")))?;
                }
            }
            return Ok(CustomerProfile {
                last_seen: seen_at,
                total_transactions: existing.total_transactions + 1,
                is_manager_card: existing.is_manager_card || is_manager_card,
                ..existing
            });
        }

        let format_str = match format_type {
            FormatType::PhoneNumber => "PHONE_NUMBER",
            FormatType::QrCode => "QR_CODE",
        };
        let cid_customer_id = Uuid::new_v4().to_string();
        let insert_sql = r#"
            INSERT INTO customer_profiles
                (normalized_id, first_seen, last_seen, total_transactions, is_manager_card,
                 store_id, format_type, cid_customer_id, avt_verified, eaiv_verified)
            VALUES ($1, $2, $2, 1, $3, $4, $5, $6, FALSE, FALSE)
        "#;
        match &self.pool {
            DatabasePool::Postgres(pool) => {
                sqlx::query(insert_sql)
                    .bind(normalized_id)
                    .bind(seen_at)
                    .bind(is_manager_card)
                    .bind(store_id)
                    .bind(format_str)
                    .bind(&cid_customer_id)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("profile insert: {e}")))?;
            }
            DatabasePool::Sqlite(pool) => {
                sqlx::query(insert_sql)
                    .bind(normalized_id)
                    .bind(seen_at)
                    .bind(is_manager_card)
                    .bind(store_id)
                    .bind(format_str)
                    .bind(&cid_customer_id)
                    .execute(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("profile insert: {e}")))?;
            }
        }

        Ok(CustomerProfile::new_insert(
            normalized_id.to_string(),
            store_id.to_string(),
            format_type,
            cid_customer_id,
            seen_at,
        ))
    }
}
