//! `DecisionContext`: the shared, append-only accumulator every stage
//! writes into and later stages read from. Data flows strictly
//! left-to-right (spec.md §2) — no stage reads a field populated by a
//! stage that runs after it.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use tier3_core::basket::{BasketLine, DiscountBucket, NormalizedLine, PricedLine};
use tier3_core::lid::FormatType;
use tier3_core::reward::Reward;

/// Raw inbound request, POS field names per spec.md §6.
#[derive(Debug, Clone)]
pub struct PosRequest {
    pub store_location_id: String,
    pub transaction_id: String,
    pub cashier_id: Option<String>,
    pub loyalty_id: String,
    pub avt_status: AvtStatus,
    pub lines: Vec<BasketLine>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AvtStatus {
    Verified,
    NotVerified,
    Unknown,
    Absent,
}

impl AvtStatus {
    pub fn parse(raw: Option<&str>) -> Self {
        match raw {
            Some("verified") => AvtStatus::Verified,
            Some("not_verified") => AvtStatus::NotVerified,
            Some("unknown") => AvtStatus::Unknown,
            _ => AvtStatus::Absent,
        }
    }
}

/// S1 output.
#[derive(Debug, Clone, Default)]
pub struct LidOutcome {
    pub valid: bool,
    pub eligible_for_tier3: bool,
    pub eligible_for_cid_fund: bool,
    pub is_manager_card: bool,
    pub normalized_id: Option<String>,
    pub format_type: Option<FormatType>,
    pub daily_count: i64,
    pub reason: String,
}

/// S2 output.
#[derive(Debug, Clone, Default)]
pub struct AgeGateOutcome {
    pub age_verified: bool,
    pub eaiv_verified: bool,
    pub eligible_for_tier3_incentives: bool,
    pub eligible_for_eaiv_only_incentives: bool,
    pub reason: String,
}

/// S3 output.
#[derive(Debug, Clone, Default)]
pub struct BasketOutcome {
    pub normalized_lines: Vec<NormalizedLine>,
    pub unknown_upcs: Vec<String>,
    pub dropped_lines: Vec<tier3_core::basket::NormalizeError>,
    pub merge_count: usize,
}

/// Multi-pack marker emitted by S4, never priced (spec.md §4.4/§9).
#[derive(Debug, Clone)]
pub struct MultiPackMarker {
    pub line_number: i64,
    pub multi_unit_indicator: bool,
    pub multi_unit_required_quantity: i64,
    pub multi_unit_discount_amount: Decimal,
    pub needs_rate_lookup: bool,
}

/// S4 output: buckets populated without monetary amounts yet.
#[derive(Debug, Clone, Default)]
pub struct DiscountTypeOutcome {
    /// Active allowance rules applicable to SKUs present in the basket,
    /// keyed by skuguid they matched so S6 can look them back up.
    pub manufacturer_allowances_by_sku: BTreeMap<String, tier3_core::catalog::AllowanceRule>,
    pub multi_pack_markers: Vec<MultiPackMarker>,
}

/// S5 output.
#[derive(Debug, Clone, Default)]
pub struct EligibilityOutcome {
    pub tier3_eligible: bool,
    pub tier3_incentives_eligible: bool,
    pub pmusa_allowances_eligible: bool,
    pub eligible_buckets: BTreeMap<DiscountBucket, bool>,
    pub reasons: Vec<String>,
}

/// S6 output.
#[derive(Debug, Clone, Default)]
pub struct PricingOutcome {
    pub priced_lines: Vec<PricedLine>,
    pub rewards: Vec<Reward>,
    pub total_discount: Decimal,
}

/// S7 output.
#[derive(Debug, Clone, Default)]
pub struct ResponseOutcome {
    pub receipt_lines: Vec<String>,
}

/// Accumulates the result of every stage for one request. Stages borrow
/// the fields they need and append their own outcome; nothing is ever
/// mutated by a later stage.
pub struct DecisionContext {
    pub request: PosRequest,
    pub received_at: DateTime<Utc>,

    pub lid: LidOutcome,
    pub age_gate: AgeGateOutcome,
    pub basket: BasketOutcome,
    pub discount_type: DiscountTypeOutcome,
    pub eligibility: EligibilityOutcome,
    pub pricing: PricingOutcome,
    pub response: ResponseOutcome,
}

impl DecisionContext {
    pub fn new(request: PosRequest, received_at: DateTime<Utc>) -> Self {
        Self {
            request,
            received_at,
            lid: LidOutcome::default(),
            age_gate: AgeGateOutcome::default(),
            basket: BasketOutcome::default(),
            discount_type: DiscountTypeOutcome::default(),
            eligibility: EligibilityOutcome::default(),
            pricing: PricingOutcome::default(),
            response: ResponseOutcome::default(),
        }
    }
}

/// Transaction-level flags returned to the POS (spec.md §6).
#[derive(Debug, Clone, Copy, Default)]
pub struct TransactionFlags {
    pub tier3_eligible: bool,
    pub cid_fund_eligible: bool,
    pub age_verified: bool,
    pub eaiv_verified: bool,
}

impl DecisionContext {
    pub fn transaction_flags(&self) -> TransactionFlags {
        TransactionFlags {
            tier3_eligible: self.lid.eligible_for_tier3,
            cid_fund_eligible: self.lid.eligible_for_cid_fund,
            age_verified: self.age_gate.age_verified,
            eaiv_verified: self.age_gate.eaiv_verified,
        }
    }
}
