//! S5 — Eligibility Gate (spec.md §4.5).

use tier3_core::basket::DiscountBucket;

use crate::context::{EligibilityOutcome, LidOutcome};

pub fn run(lid: &LidOutcome) -> EligibilityOutcome {
    let tier3_eligible = lid.eligible_for_tier3;
    let pmusa_allowances_eligible = tier3_eligible && lid.eligible_for_cid_fund;

    let mut eligible_buckets = std::collections::BTreeMap::new();
    for bucket in DiscountBucket::ORDER {
        eligible_buckets.insert(bucket, tier3_eligible);
    }

    let mut reasons = Vec::new();
    if tier3_eligible && !lid.eligible_for_cid_fund {
        eligible_buckets.insert(DiscountBucket::ManufacturerCoupon, false);
        eligible_buckets.insert(DiscountBucket::MultiUnit, false);
        reasons.push(
            "PM USA allowances ineligible: loyalty ID exceeded 5 transactions/day".to_string(),
        );
    }

    EligibilityOutcome {
        tier3_eligible,
        tier3_incentives_eligible: tier3_eligible,
        pmusa_allowances_eligible,
        eligible_buckets,
        reasons,
    }
}

/// Per-line PM USA eligibility (spec.md §4.5): holds iff
/// `pmusa_allowances_eligible ∧ is_marlboro ∧ uom==PACK ∧ ¬is_promotional_upc`.
pub fn line_is_pmusa_eligible(
    eligibility: &EligibilityOutcome,
    line: &tier3_core::basket::NormalizedLine,
) -> bool {
    eligibility.pmusa_allowances_eligible
        && line.is_marlboro()
        && line.unit_of_measure == Some(tier3_core::catalog::UnitOfMeasure::Pack)
        && !line.is_promotional_upc
}
