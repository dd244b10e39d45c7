//! Wire types for the POS-facing JSON contract (spec.md §6). Field names
//! mirror the POS's own vocabulary (`item_code`/`pos_code`,
//! `sales_quantity`, `regular_unit_price`) rather than the engine's
//! internal domain types; unknown fields are ignored by serde's default
//! behavior.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tier3_core::basket::BasketLine;
use tier3_pipeline::context::{AvtStatus, PosRequest};

#[derive(Debug, Clone, Deserialize)]
pub struct PosTransactionRequest {
    pub store_location_id: String,
    pub transaction_id: String,
    #[serde(default)]
    pub cashier_id: Option<String>,
    #[serde(default)]
    pub loyalty_id: String,
    #[serde(default)]
    pub avt_status: Option<String>,
    #[serde(default)]
    pub lines: Vec<PosTransactionLine>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PosTransactionLine {
    pub line_number: i64,
    #[serde(alias = "item_code", alias = "pos_code")]
    pub upc: String,
    pub sales_quantity: i64,
    #[serde(default)]
    pub regular_unit_price: Option<Decimal>,
    #[serde(default)]
    pub extended_price: Option<Decimal>,
    #[serde(default)]
    pub description: Option<String>,
}

impl PosTransactionRequest {
    pub fn into_domain(self) -> PosRequest {
        let lines = self
            .lines
            .into_iter()
            .map(|line| {
                let unit_price = line.regular_unit_price.unwrap_or_else(|| {
                    line.extended_price
                        .map(|ext| {
                            if line.sales_quantity != 0 {
                                ext / Decimal::from(line.sales_quantity)
                            } else {
                                Decimal::ZERO
                            }
                        })
                        .unwrap_or(Decimal::ZERO)
                });
                BasketLine {
                    line_number: line.line_number,
                    upc: line.upc,
                    quantity: line.sales_quantity,
                    unit_price,
                    description: line.description,
                }
            })
            .collect();

        PosRequest {
            store_location_id: self.store_location_id,
            transaction_id: self.transaction_id,
            cashier_id: self.cashier_id,
            loyalty_id: self.loyalty_id,
            avt_status: AvtStatus::parse(self.avt_status.as_deref()),
            lines,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PosTransactionResponse {
    pub rewards: Vec<RewardDto>,
    pub receipt_lines: Vec<String>,
    pub tier3_eligible: bool,
    pub cid_fund_eligible: bool,
    pub age_verified: bool,
    pub eaiv_verified: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct RewardDto {
    pub reward_id: String,
    pub line_number: i64,
    pub value: Decimal,
    pub short_desc: String,
    pub long_desc: String,
}

impl From<tier3_pipeline::DecisionResult> for PosTransactionResponse {
    fn from(result: tier3_pipeline::DecisionResult) -> Self {
        Self {
            rewards: result
                .rewards
                .into_iter()
                .map(|r| RewardDto {
                    reward_id: r.reward_id,
                    line_number: r.line_number,
                    value: r.value,
                    short_desc: r.short_desc,
                    long_desc: r.long_desc,
                })
                .collect(),
            receipt_lines: result.receipt_lines,
            tier3_eligible: result.flags.tier3_eligible,
            cid_fund_eligible: result.flags.cid_fund_eligible,
            age_verified: result.flags.age_verified,
            eaiv_verified: result.flags.eaiv_verified,
        }
    }
}
