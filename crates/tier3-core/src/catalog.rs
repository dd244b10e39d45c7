use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    Cig,
    Mst,
    Cigar,
    Onp,
    UnknownTobacco,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UnitOfMeasure {
    Carton,
    Pack,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MatchedUpcType {
    Carton,
    Pack,
    CartonSuppressed,
}

/// Carton or pack UPC block within a `CatalogEntry`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CartonBlock {
    pub upc: Option<String>,
    pub suppressed_upc: Option<String>,
    pub conversion_factor: Decimal,
    pub is_promotional: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackBlock {
    pub upc: Option<String>,
    pub conversion_factor: Decimal,
    pub is_promotional: bool,
}

/// One SKU row, carrying both carton and pack UPCs (either may be absent).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub skuguid: String,
    pub sku_name: String,
    pub brand: String,
    pub manufacturer: String,
    pub category: Category,
    pub program_eligibility: bool,
    pub carton: CartonBlock,
    pub pack: PackBlock,
}

impl CatalogEntry {
    pub fn is_marlboro(&self) -> bool {
        self.brand.to_uppercase().contains("MARLBORO")
    }

    /// Resolve a UPC against this entry, searching `CARTON_UPC`,
    /// `PACK_UPC`, `CARTON_SuppressedUPC` in that order (first hit wins),
    /// per spec.md §4.3.
    pub fn match_upc(&self, upc: &str) -> Option<UpcMatch> {
        if self.carton.upc.as_deref() == Some(upc) {
            return Some(UpcMatch {
                matched_upc_type: MatchedUpcType::Carton,
                unit_of_measure: UnitOfMeasure::Carton,
                conversion_factor: self.carton.conversion_factor,
                is_promotional: self.carton.is_promotional,
            });
        }
        if self.pack.upc.as_deref() == Some(upc) {
            return Some(UpcMatch {
                matched_upc_type: MatchedUpcType::Pack,
                unit_of_measure: UnitOfMeasure::Pack,
                conversion_factor: self.pack.conversion_factor,
                is_promotional: self.pack.is_promotional,
            });
        }
        if self.carton.suppressed_upc.as_deref() == Some(upc) {
            return Some(UpcMatch {
                matched_upc_type: MatchedUpcType::CartonSuppressed,
                unit_of_measure: UnitOfMeasure::Carton,
                conversion_factor: self.carton.conversion_factor,
                is_promotional: self.carton.is_promotional,
            });
        }
        None
    }
}

/// Result of resolving a UPC against a `CatalogEntry`.
#[derive(Debug, Clone, Copy)]
pub struct UpcMatch {
    pub matched_upc_type: MatchedUpcType,
    pub unit_of_measure: UnitOfMeasure,
    pub conversion_factor: Decimal,
    pub is_promotional: bool,
}

/// Active iff `start_date <= today <= end_date`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AllowanceRule {
    pub allowance_id: String,
    pub allowance_type: String,
    pub eligible_skus: Vec<String>,
    pub eligible_uoms: Vec<UnitOfMeasure>,
    pub min_qty: i64,
    pub max_allowance_per_transaction: Option<Decimal>,
    pub max_daily_transactions_per_loyalty: Option<i64>,
    pub manufacturer_funded_amount: Option<Decimal>,
    pub promo_code: Option<String>,
    pub promotional_upcs_eligible: bool,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

impl AllowanceRule {
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.start_date <= today && today <= self.end_date
    }

    pub fn applies_to_sku(&self, skuguid: &str) -> bool {
        self.eligible_skus.is_empty() || self.eligible_skus.iter().any(|s| s == skuguid)
    }
}
