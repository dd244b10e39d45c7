//! S3 — Basket Normalizer (spec.md §4.3).

use std::collections::HashMap;

use rust_decimal::Decimal;
use tier3_core::basket::{BasketLine, Category, MatchedUpcType, NormalizeError, NormalizedLine, UnitOfMeasure};
use tier3_core::EngineResult;
use tier3_persistence::Store;

use crate::context::BasketOutcome;

pub async fn run(store: &Store, lines: &[BasketLine]) -> EngineResult<BasketOutcome> {
    let mut resolved = Vec::with_capacity(lines.len());
    let mut unknown_upcs = Vec::new();
    let mut dropped_lines = Vec::new();

    for line in lines {
        if line.upc.trim().is_empty() {
            dropped_lines.push(NormalizeError {
                line_number: line.line_number,
                reason: "line has no UPC".to_string(),
            });
            continue;
        }

        let catalog_entry = store.catalog().find_by_upc(&line.upc).await?;

        let normalized = match catalog_entry {
            Some(entry) => {
                let upc_match = entry.match_upc(&line.upc);
                let (unit_of_measure, matched_upc_type, is_promotional) = match upc_match {
                    Some(m) => (Some(m.unit_of_measure), Some(m.matched_upc_type), m.is_promotional),
                    None => (None, None, false),
                };
                NormalizedLine {
                    line_number: line.line_number,
                    upc: line.upc.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    description: line.description.clone(),
                    skuguid: Some(entry.skuguid.clone()),
                    sku_name: Some(entry.sku_name.clone()),
                    brand: Some(entry.brand.clone()),
                    manufacturer: Some(entry.manufacturer.clone()),
                    category: entry.category,
                    program_eligibility: entry.program_eligibility,
                    unit_of_measure,
                    matched_upc_type,
                    is_promotional_upc: is_promotional,
                    is_unknown: false,
                }
            }
            None => {
                unknown_upcs.push(line.upc.clone());
                NormalizedLine {
                    line_number: line.line_number,
                    upc: line.upc.clone(),
                    quantity: line.quantity,
                    unit_price: line.unit_price,
                    description: line.description.clone(),
                    skuguid: None,
                    sku_name: None,
                    brand: None,
                    manufacturer: None,
                    category: Category::UnknownTobacco,
                    program_eligibility: false,
                    unit_of_measure: None,
                    matched_upc_type: None,
                    is_promotional_upc: false,
                    is_unknown: true,
                }
            }
        };
        resolved.push(normalized);
    }

    let pre_merge_count = resolved.len();
    let normalized_lines = merge_lines(resolved);
    let merge_count = pre_merge_count - normalized_lines.len();

    Ok(BasketOutcome {
        normalized_lines,
        unknown_upcs,
        dropped_lines,
        merge_count,
    })
}

/// Group by `(upc, unit_price)` preserving first-occurrence order;
/// quantities sum, all other fields take the first occurrence's value
/// (spec.md §4.3). Lines with different `unit_price` for the same UPC do
/// not merge.
fn merge_lines(lines: Vec<NormalizedLine>) -> Vec<NormalizedLine> {
    let mut order: Vec<(String, Decimal)> = Vec::new();
    let mut merged: HashMap<(String, Decimal), NormalizedLine> = HashMap::new();

    for line in lines {
        let key = (line.upc.clone(), line.unit_price);
        match merged.get_mut(&key) {
            Some(existing) => existing.quantity += line.quantity,
            None => {
                order.push(key.clone());
                merged.insert(key, line);
            }
        }
    }

    order
        .into_iter()
        .map(|key| merged.remove(&key).expect("key was just inserted"))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn line(n: i64, upc: &str, qty: i64, price: Decimal) -> NormalizedLine {
        NormalizedLine {
            line_number: n,
            upc: upc.to_string(),
            quantity: qty,
            unit_price: price,
            description: None,
            skuguid: Some("sku-1".to_string()),
            sku_name: None,
            brand: None,
            manufacturer: None,
            category: Category::Cig,
            program_eligibility: true,
            unit_of_measure: Some(UnitOfMeasure::Pack),
            matched_upc_type: Some(MatchedUpcType::Pack),
            is_promotional_upc: false,
            is_unknown: false,
        }
    }

    #[test]
    fn merges_identical_upc_and_price() {
        let lines = vec![
            line(1, "111", 1, dec!(7.00)),
            line(2, "111", 1, dec!(7.00)),
        ];
        let merged = merge_lines(lines);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].quantity, 2);
    }

    #[test]
    fn does_not_merge_different_price() {
        let lines = vec![
            line(1, "111", 1, dec!(7.00)),
            line(2, "111", 1, dec!(7.50)),
        ];
        let merged = merge_lines(lines);
        assert_eq!(merged.len(), 2);
    }

    #[test]
    fn preserves_first_occurrence_order() {
        let lines = vec![
            line(1, "222", 1, dec!(5.00)),
            line(2, "111", 1, dec!(7.00)),
            line(3, "222", 1, dec!(5.00)),
        ];
        let merged = merge_lines(lines);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].upc, "222");
        assert_eq!(merged[0].quantity, 2);
        assert_eq!(merged[1].upc, "111");
    }
}
