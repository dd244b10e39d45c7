//! S4 — Discount Typer (spec.md §4.4). Populates buckets without
//! assigning monetary amounts; multi-pack detection only, never priced.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tier3_core::basket::{NormalizedLine, UnitOfMeasure};
use tier3_core::EngineResult;
use tier3_persistence::Store;

use crate::context::{DiscountTypeOutcome, MultiPackMarker};

pub async fn run(
    store: &Store,
    lines: &[NormalizedLine],
    eligible_for_tier3: bool,
    today: NaiveDate,
) -> EngineResult<DiscountTypeOutcome> {
    let mut manufacturer_allowances_by_sku = std::collections::BTreeMap::new();

    if eligible_for_tier3 {
        let skuguids: Vec<String> = lines.iter().filter_map(|l| l.skuguid.clone()).collect();
        let rules = store
            .catalog()
            .active_allowances_for_skus(&skuguids, today)
            .await?;
        for rule in rules {
            if !rule.is_active(today) {
                continue;
            }
            for line in lines {
                let Some(skuguid) = &line.skuguid else { continue };
                if rule.applies_to_sku(skuguid) {
                    manufacturer_allowances_by_sku.insert(skuguid.clone(), rule.clone());
                }
            }
        }
    }

    let multi_pack_markers = lines
        .iter()
        .filter_map(|line| detect_multi_pack(line))
        .collect();

    Ok(DiscountTypeOutcome {
        manufacturer_allowances_by_sku,
        multi_pack_markers,
    })
}

/// PM USA Marlboro Multi-Pack Fund detection only (spec.md §4.4): brand
/// contains "MARLBORO", uom is PACK, not a promotional UPC, and the
/// post-merge quantity is 2 or 3.
fn detect_multi_pack(line: &NormalizedLine) -> Option<MultiPackMarker> {
    if !line.is_marlboro() {
        return None;
    }
    if line.unit_of_measure != Some(UnitOfMeasure::Pack) {
        return None;
    }
    if line.is_promotional_upc {
        return None;
    }
    if !matches!(line.quantity, 2 | 3) {
        return None;
    }
    Some(MultiPackMarker {
        line_number: line.line_number,
        multi_unit_indicator: true,
        multi_unit_required_quantity: line.quantity,
        multi_unit_discount_amount: Decimal::ZERO,
        needs_rate_lookup: true,
    })
}
