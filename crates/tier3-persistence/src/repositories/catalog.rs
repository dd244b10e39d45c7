//! Read-only catalog and allowance lookups. Populated by the external
//! allowance-catalog synchronizer (out of scope, spec.md §1); the engine
//! only ever reads these tables.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use tier3_core::catalog::{AllowanceRule, CartonBlock, CatalogEntry, Category, PackBlock, UnitOfMeasure};
use tier3_core::EngineError;

use crate::connection::DatabasePool;

#[async_trait]
pub trait CatalogRepository {
    /// Resolve an entry whose carton UPC, pack UPC, or carton suppressed
    /// UPC equals `upc`.
    async fn find_by_upc(&self, upc: &str) -> Result<Option<CatalogEntry>, EngineError>;

    /// Active allowance rules (by date window) applicable to any of the
    /// given SKUGUIDs.
    async fn active_allowances_for_skus(
        &self,
        skuguids: &[String],
        today: NaiveDate,
    ) -> Result<Vec<AllowanceRule>, EngineError>;
}

pub struct SqlxCatalogRepository {
    pool: DatabasePool,
}

impl SqlxCatalogRepository {
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct CatalogRow {
    skuguid: String,
    sku_name: String,
    brand: String,
    manufacturer: String,
    category: String,
    program_eligibility: bool,
    carton_upc: Option<String>,
    carton_suppressed_upc: Option<String>,
    carton_conversion: Decimal,
    carton_is_promotional: bool,
    pack_upc: Option<String>,
    pack_conversion: Decimal,
    pack_is_promotional: bool,
}

fn parse_category(s: &str) -> Category {
    match s {
        "CIG" => Category::Cig,
        "MST" => Category::Mst,
        "CIGAR" => Category::Cigar,
        "ONP" => Category::Onp,
        _ => Category::UnknownTobacco,
    }
}

fn row_to_entry(row: CatalogRow) -> CatalogEntry {
    CatalogEntry {
        skuguid: row.skuguid,
        sku_name: row.sku_name,
        brand: row.brand,
        manufacturer: row.manufacturer,
        category: parse_category(&row.category),
        program_eligibility: row.program_eligibility,
        carton: CartonBlock {
            upc: row.carton_upc,
            suppressed_upc: row.carton_suppressed_upc,
            conversion_factor: row.carton_conversion,
            is_promotional: row.carton_is_promotional,
        },
        pack: PackBlock {
            upc: row.pack_upc,
            conversion_factor: row.pack_conversion,
            is_promotional: row.pack_is_promotional,
        },
    }
}

const FIND_BY_UPC_SQL: &str = r#"
    SELECT skuguid, sku_name, brand, manufacturer, category, program_eligibility,
           carton_upc, carton_suppressed_upc, carton_conversion, carton_is_promotional,
           pack_upc, pack_conversion, pack_is_promotional
    FROM upc_master
    WHERE carton_upc = $1 OR pack_upc = $1 OR carton_suppressed_upc = $1
    LIMIT 1
"#;

#[async_trait]
impl CatalogRepository for SqlxCatalogRepository {
    async fn find_by_upc(&self, upc: &str) -> Result<Option<CatalogEntry>, EngineError> {
        let row: Option<CatalogRow> = match &self.pool {
            DatabasePool::Postgres(pool) => sqlx::query_as(FIND_BY_UPC_SQL)
                .bind(upc)
                .fetch_optional(pool)
                .await
                .map_err(|e| EngineError::Database(format!("catalog lookup: {e}")))?,
            DatabasePool::Sqlite(pool) => sqlx::query_as(FIND_BY_UPC_SQL)
                .bind(upc)
                .fetch_optional(pool)
                .await
                .map_err(|e| EngineError::Database(format!("catalog lookup: {e}")))?,
        };
        Ok(row.map(row_to_entry))
    }

    async fn active_allowances_for_skus(
        &self,
        skuguids: &[String],
        today: NaiveDate,
    ) -> Result<Vec<AllowanceRule>, EngineError> {
        if skuguids.is_empty() {
            return Ok(Vec::new());
        }

        // Portable against both backends without a variable-length IN
        // list: fetch all active rules and filter the SKU join in Rust,
        // since allowance catalogs are small (hundreds, not millions of
        // rows) and this runs once per request against a read-only table.
        let sql = r#"
            SELECT allowance_id, allowance_type, eligible_uoms, min_qty,
                   max_allowance_per_transaction, max_daily_transactions_per_loyalty,
                   manufacturer_funded_amount, promo_code, promotional_upcs_eligible,
                   start_date, end_date
            FROM loyalty_allowances
            WHERE start_date <= $1 AND end_date >= $1
        "#;

        #[derive(sqlx::FromRow)]
        struct AllowanceRow {
            allowance_id: String,
            allowance_type: String,
            eligible_uoms: String,
            min_qty: i64,
            max_allowance_per_transaction: Option<Decimal>,
            max_daily_transactions_per_loyalty: Option<i64>,
            manufacturer_funded_amount: Option<Decimal>,
            promo_code: Option<String>,
            promotional_upcs_eligible: bool,
            start_date: NaiveDate,
            end_date: NaiveDate,
        }

        let rows: Vec<AllowanceRow> = match &self.pool {
            DatabasePool::Postgres(pool) => sqlx::query_as(sql)
                .bind(today)
                .fetch_all(pool)
                .await
                .map_err(|e| EngineError::Database(format!("allowance lookup: {e}")))?,
            DatabasePool::Sqlite(pool) => sqlx::query_as(sql)
                .bind(today)
                .fetch_all(pool)
                .await
                .map_err(|e| EngineError::Database(format!("allowance lookup: {e}")))?,
        };

        let mut matched = Vec::new();
        for row in rows {
            let sku_sql = "SELECT skuguid FROM loyalty_allowance_skus WHERE allowance_id = $1";
            let eligible_skus: Vec<String> = match &self.pool {
                DatabasePool::Postgres(pool) => sqlx::query_scalar(sku_sql)
                    .bind(&row.allowance_id)
                    .fetch_all(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("allowance sku lookup: {e}")))?,
                DatabasePool::Sqlite(pool) => sqlx::query_scalar(sku_sql)
                    .bind(&row.allowance_id)
                    .fetch_all(pool)
                    .await
                    .map_err(|e| EngineError::Database(format!("allowance sku lookup: {e}")))?,
            };

            let applies = eligible_skus.is_empty()
                || eligible_skus.iter().any(|s| skuguids.contains(s));
            if !applies {
                continue;
            }

            let eligible_uoms = row
                .eligible_uoms
                .split(',')
                .filter_map(|s| match s.trim() {
                    "CARTON" => Some(UnitOfMeasure::Carton),
                    "PACK" => Some(UnitOfMeasure::Pack),
                    _ => None,
                })
                .collect();

            matched.push(AllowanceRule {
                allowance_id: row.allowance_id,
                allowance_type: row.allowance_type,
                eligible_skus,
                eligible_uoms,
                min_qty: row.min_qty,
                max_allowance_per_transaction: row.max_allowance_per_transaction,
                max_daily_transactions_per_loyalty: row.max_daily_transactions_per_loyalty,
                manufacturer_funded_amount: row.manufacturer_funded_amount,
                promo_code: row.promo_code,
                promotional_upcs_eligible: row.promotional_upcs_eligible,
                start_date: row.start_date,
                end_date: row.end_date,
            });
        }

        Ok(matched)
    }
}
