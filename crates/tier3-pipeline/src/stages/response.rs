//! S7 — Response Builder (spec.md §4.7). Produces a receipt block of at
//! most 10 lines, each at most 32 characters.

use rust_decimal::Decimal;
use tier3_core::basket::DiscountBucket;

use crate::context::{AgeGateOutcome, EligibilityOutcome, LidOutcome, PricingOutcome};

const MAX_LINES: usize = 10;
const MAX_LINE_LEN: usize = 32;
const HEADER: &str = "*** LOYALTY REWARDS ***";
const SEPARATOR: &str = "------------------------";

pub fn run(
    lid: &LidOutcome,
    age_gate: &AgeGateOutcome,
    eligibility: &EligibilityOutcome,
    pricing: &PricingOutcome,
) -> Vec<String> {
    if pricing.rewards.is_empty() {
        let body = explanatory_body(lid, age_gate);
        return vec![HEADER.to_string(), body];
    }

    let mut lines = vec![HEADER.to_string()];

    let bucket_aggregate = |bucket: DiscountBucket| -> Decimal {
        pricing
            .priced_lines
            .iter()
            .map(|p| p.bucket_amount(bucket))
            .sum()
    };

    for (bucket, label) in [
        (DiscountBucket::Loyalty, "LOYALTY SAVINGS"),
        (DiscountBucket::ManufacturerCoupon, "MFG COUPON"),
        (DiscountBucket::MultiUnit, "MULTI-BUY SAVINGS"),
        (DiscountBucket::Retailer, "STORE SAVINGS"),
    ] {
        let amount = bucket_aggregate(bucket);
        if amount > Decimal::ZERO {
            lines.push(money_line(label, amount));
        }
    }

    lines.push(SEPARATOR.to_string());
    lines.push(money_line("TOTAL SAVINGS", pricing.total_discount));
    lines.push("*** THANK YOU ***".to_string());

    if eligibility.tier3_eligible && !age_gate.eaiv_verified {
        let bonus_lines = ["APP BONUS AVAILABLE", "VERIFY ID IN APP TO UNLOCK"];
        if lines.len() + bonus_lines.len() <= MAX_LINES {
            lines.extend(bonus_lines.iter().map(|s| s.to_string()));
        }
    }

    lines.truncate(MAX_LINES);
    for line in &lines {
        debug_assert!(line.chars().count() <= MAX_LINE_LEN);
    }
    lines
}

fn money_line(label: &str, amount: Decimal) -> String {
    let amount_str = format!("-${:.2}", amount);
    let pad = MAX_LINE_LEN.saturating_sub(label.len() + amount_str.len());
    format!("{label}{}{amount_str}", " ".repeat(pad))
}

/// Precedence order from spec.md §4.7 when no rewards were emitted.
fn explanatory_body(lid: &LidOutcome, age_gate: &AgeGateOutcome) -> String {
    if !lid.valid || !lid.eligible_for_tier3 {
        "Loyalty ID not eligible".to_string()
    } else if !age_gate.age_verified {
        "Age verification required".to_string()
    } else {
        "No eligible rewards".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn money_line_fits_budget() {
        let line = money_line("LOYALTY SAVINGS", Decimal::new(97, 2));
        assert!(line.chars().count() <= MAX_LINE_LEN);
        assert!(line.ends_with("-$0.97"));
    }
}
