//! S6 — Pricing (spec.md §4.6). Applies discounts in the fixed bucket
//! order, enforces the price floor, rounds exactly once at the final
//! summation, and emits rewards.

use rust_decimal::Decimal;
use tier3_core::basket::{DiscountBucket, NormalizedLine, PricedLine};
use tier3_core::money::{non_negative, round2};
use tier3_core::reward::{reward_id, truncate_desc, Reward};

use crate::context::{DiscountTypeOutcome, EligibilityOutcome, PricingOutcome};
use crate::stages::eligibility::line_is_pmusa_eligible;

const MAX_DESC_LEN: usize = 32;

pub fn run(
    lines: &[NormalizedLine],
    eligibility: &EligibilityOutcome,
    discount_type: &DiscountTypeOutcome,
    age_verified: bool,
    default_loyalty_discount: Decimal,
) -> PricingOutcome {
    let mut priced_lines = Vec::with_capacity(lines.len());
    let mut rewards = Vec::new();
    let mut total_discount = Decimal::ZERO;

    for line in lines {
        let mut priced = PricedLine::new(line.clone());

        // Age not verified short-circuits all Tier 3 benefits: every
        // bucket stays zero for this line (spec.md §4.2, universal
        // invariant in §8).
        if age_verified {
            for bucket in DiscountBucket::ORDER {
                if !eligibility.eligible_buckets.get(&bucket).copied().unwrap_or(false) {
                    continue;
                }
                let amount = bucket_amount(bucket, line, eligibility, discount_type, default_loyalty_discount);
                if amount > Decimal::ZERO {
                    priced.discounts_by_bucket.insert(bucket, amount);
                }
            }
        }

        let base_extended_price = line.extended_price();
        let raw_total: Decimal = priced.discounts_by_bucket.values().sum();
        let clamped_total = raw_total.min(base_extended_price);

        // If the buckets together exceed the line's extended price, scale
        // each bucket down proportionally so sum(discounts_by_bucket) still
        // equals total_discount exactly (spec.md §8 invariant).
        if clamped_total < raw_total && raw_total > Decimal::ZERO {
            let scale = clamped_total / raw_total;
            for amount in priced.discounts_by_bucket.values_mut() {
                *amount = round2(*amount * scale);
            }
        }

        let actual_total_discount = round2(clamped_total);
        let final_extended_price = round2(non_negative(base_extended_price - actual_total_discount));

        priced.total_discount = actual_total_discount;
        priced.final_extended_price = final_extended_price;
        priced.final_unit_price = if line.quantity != 0 {
            round2(final_extended_price / Decimal::from(line.quantity))
        } else {
            Decimal::ZERO
        };

        if actual_total_discount > Decimal::ZERO {
            rewards.push(build_reward(line, &priced, actual_total_discount));
        }

        total_discount += actual_total_discount;
        priced_lines.push(priced);
    }

    PricingOutcome {
        priced_lines,
        rewards,
        total_discount: round2(total_discount),
    }
}

fn bucket_amount(
    bucket: DiscountBucket,
    line: &NormalizedLine,
    eligibility: &EligibilityOutcome,
    discount_type: &DiscountTypeOutcome,
    default_loyalty_discount: Decimal,
) -> Decimal {
    match bucket {
        DiscountBucket::Loyalty => loyalty_amount(line, discount_type, default_loyalty_discount),
        DiscountBucket::ManufacturerCoupon => {
            manufacturer_coupon_amount(line, eligibility, discount_type)
        }
        // Multi-unit is detection-only in this version; the POS applies
        // the multi-pack fund amount itself (spec.md §4.4/§4.6).
        DiscountBucket::MultiUnit => Decimal::ZERO,
        // Retailer, other-manufacturer, and transaction buckets are
        // placeholders in this version (spec.md §4.4).
        DiscountBucket::Retailer
        | DiscountBucket::OtherManufacturer
        | DiscountBucket::Transaction => Decimal::ZERO,
    }
}

fn matching_rule<'a>(
    line: &NormalizedLine,
    discount_type: &'a DiscountTypeOutcome,
) -> Option<&'a tier3_core::catalog::AllowanceRule> {
    let skuguid = line.skuguid.as_deref()?;
    discount_type
        .manufacturer_allowances_by_sku
        .get(skuguid)
        .filter(|rule| line_satisfies_rule(line, rule))
}

fn line_satisfies_rule(line: &NormalizedLine, rule: &tier3_core::catalog::AllowanceRule) -> bool {
    if line.quantity < rule.min_qty {
        return false;
    }
    if rule.eligible_uoms.is_empty() {
        return true;
    }
    match line.unit_of_measure {
        Some(uom) => rule.eligible_uoms.contains(&uom),
        None => false,
    }
}

fn is_manufacturer_rule(rule: &tier3_core::catalog::AllowanceRule) -> bool {
    rule.allowance_type.to_uppercase().contains("MANUFACTURER")
        || rule.allowance_type.to_uppercase().contains("COUPON")
}

/// Amount clamped to the line's extended price (spec.md §4.6 step 2).
fn loyalty_amount(
    line: &NormalizedLine,
    discount_type: &DiscountTypeOutcome,
    default_loyalty_discount: Decimal,
) -> Decimal {
    let Some(rule) = matching_rule(line, discount_type) else {
        return Decimal::ZERO;
    };
    if is_manufacturer_rule(rule) {
        return Decimal::ZERO;
    }
    let amount = rule.max_allowance_per_transaction.unwrap_or(default_loyalty_discount);
    amount.min(line.extended_price()).max(Decimal::ZERO)
}

fn manufacturer_coupon_amount(
    line: &NormalizedLine,
    eligibility: &EligibilityOutcome,
    discount_type: &DiscountTypeOutcome,
) -> Decimal {
    if !line_is_pmusa_eligible(eligibility, line) {
        return Decimal::ZERO;
    }
    let Some(rule) = matching_rule(line, discount_type) else {
        return Decimal::ZERO;
    };
    if !is_manufacturer_rule(rule) {
        return Decimal::ZERO;
    }
    let amount = rule
        .manufacturer_funded_amount
        .or(rule.max_allowance_per_transaction)
        .unwrap_or(Decimal::ZERO);
    amount.min(line.extended_price()).max(Decimal::ZERO)
}

fn build_reward(line: &NormalizedLine, priced: &PricedLine, total_discount: Decimal) -> Reward {
    let mut tags = Vec::new();
    // Order: loyalty, manufacturer (spec.md §4.6 step 4).
    if priced.bucket_amount(DiscountBucket::Loyalty) > Decimal::ZERO {
        tags.push("LOYALTY".to_string());
    }
    if priced.bucket_amount(DiscountBucket::ManufacturerCoupon) > Decimal::ZERO {
        tags.push("MANUFACTURER".to_string());
    }
    let desc = if tags.is_empty() {
        "REWARD".to_string()
    } else {
        tags.join(" ")
    };

    Reward {
        reward_id: reward_id(line.line_number),
        line_number: line.line_number,
        value: total_discount,
        short_desc: truncate_desc(&desc, MAX_DESC_LEN),
        long_desc: truncate_desc(&desc, MAX_DESC_LEN),
        bucket_tags: tags,
    }
}
