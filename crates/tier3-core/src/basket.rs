use crate::catalog::{Category, MatchedUpcType, UnitOfMeasure};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Raw basket line as received from the POS, cents resolution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BasketLine {
    pub line_number: i64,
    pub upc: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub description: Option<String>,
}

/// A basket line after catalog resolution and S3 merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NormalizedLine {
    pub line_number: i64,
    pub upc: String,
    pub quantity: i64,
    pub unit_price: Decimal,
    pub description: Option<String>,

    pub skuguid: Option<String>,
    pub sku_name: Option<String>,
    pub brand: Option<String>,
    pub manufacturer: Option<String>,
    pub category: Category,
    pub program_eligibility: bool,

    pub unit_of_measure: Option<UnitOfMeasure>,
    pub matched_upc_type: Option<MatchedUpcType>,
    pub is_promotional_upc: bool,
    pub is_unknown: bool,
}

impl NormalizedLine {
    pub fn is_marlboro(&self) -> bool {
        self.brand
            .as_deref()
            .map(|b| b.to_uppercase().contains("MARLBORO"))
            .unwrap_or(false)
    }

    pub fn extended_price(&self) -> Decimal {
        self.unit_price * Decimal::from(self.quantity)
    }
}

/// Named discount buckets, in the fixed pricing order (spec.md §4.6).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiscountBucket {
    MultiUnit,
    ManufacturerCoupon,
    Loyalty,
    Retailer,
    OtherManufacturer,
    Transaction,
}

impl DiscountBucket {
    /// Fixed application order. New buckets are inserted explicitly here,
    /// never iterated from an unordered map, since order affects rounding
    /// and the price floor (spec.md §9).
    pub const ORDER: [DiscountBucket; 6] = [
        DiscountBucket::MultiUnit,
        DiscountBucket::ManufacturerCoupon,
        DiscountBucket::Loyalty,
        DiscountBucket::Retailer,
        DiscountBucket::OtherManufacturer,
        DiscountBucket::Transaction,
    ];
}

/// A `NormalizedLine` enriched with per-bucket discount amounts and final
/// pricing. Manufacturer allowance amounts are tracked separately from the
/// "manufacturer_coupon" bucket name used in spec.md §3's bucket list —
/// PM USA / allowance amounts post to `ManufacturerCoupon`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricedLine {
    pub line: NormalizedLine,
    pub discounts_by_bucket: BTreeMap<DiscountBucket, Decimal>,
    pub total_discount: Decimal,
    pub final_unit_price: Decimal,
    pub final_extended_price: Decimal,
}

impl PricedLine {
    pub fn new(line: NormalizedLine) -> Self {
        let mut discounts_by_bucket = BTreeMap::new();
        for bucket in DiscountBucket::ORDER {
            discounts_by_bucket.insert(bucket, Decimal::ZERO);
        }
        let unit_price = line.unit_price;
        Self {
            line,
            discounts_by_bucket,
            total_discount: Decimal::ZERO,
            final_unit_price: unit_price,
            final_extended_price: Decimal::ZERO,
        }
    }

    pub fn bucket_amount(&self, bucket: DiscountBucket) -> Decimal {
        self.discounts_by_bucket
            .get(&bucket)
            .copied()
            .unwrap_or(Decimal::ZERO)
    }
}

#[derive(Debug, Clone, Default)]
pub struct NormalizeError {
    pub line_number: i64,
    pub reason: String,
}
