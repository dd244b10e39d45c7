//! Orchestrates the seven stages in dependency order and performs the
//! final transaction/line write (spec.md §2, §5 ordering guarantees).

use rust_decimal::Decimal;
use tier3_core::{Clock, EngineResult};
use tier3_persistence::repositories::TransactionSummary;
use tier3_persistence::Store;

use crate::context::{DecisionContext, PosRequest, TransactionFlags};
use crate::stages;

pub struct Pipeline {
    store: Store,
    clock: std::sync::Arc<dyn Clock>,
    daily_cap: i64,
    default_loyalty_discount_cents: i64,
}

/// Everything the POS-facing layer needs to build its response (spec.md §6).
pub struct DecisionResult {
    pub rewards: Vec<tier3_core::reward::Reward>,
    pub receipt_lines: Vec<String>,
    pub flags: TransactionFlags,
}

impl Pipeline {
    pub fn new(
        store: Store,
        clock: std::sync::Arc<dyn Clock>,
        daily_cap: i64,
        default_loyalty_discount_cents: i64,
    ) -> Self {
        Self {
            store,
            clock,
            daily_cap,
            default_loyalty_discount_cents,
        }
    }

    pub async fn run(&self, request: PosRequest) -> EngineResult<DecisionResult> {
        let now = self.clock.now();
        let today = self.clock.today();
        let mut ctx = DecisionContext::new(request, now);

        // S1 — LID Validator.
        ctx.lid = stages::lid::run(
            &self.store,
            &ctx.request.loyalty_id,
            &ctx.request.store_location_id,
            today,
            now,
            self.daily_cap,
        )
        .await?;

        // S2 — Age Gate.
        ctx.age_gate = stages::age_gate::run(
            &self.store,
            ctx.request.avt_status,
            &ctx.lid,
            &ctx.request.transaction_id,
            &ctx.request.store_location_id,
            ctx.request.cashier_id.as_deref(),
            now,
        )
        .await?;

        // S3 — Basket Normalizer. Runs even on an invalid LID / unverified
        // age so the response still carries a (zero-reward) priced basket.
        ctx.basket = stages::basket::run(&self.store, &ctx.request.lines).await?;

        // S4 — Discount Typer.
        ctx.discount_type = stages::discount_typer::run(
            &self.store,
            &ctx.basket.normalized_lines,
            ctx.lid.eligible_for_tier3,
            today,
        )
        .await?;

        // S5 — Eligibility Gate.
        ctx.eligibility = stages::eligibility::run(&ctx.lid);

        // S6 — Pricing.
        let default_loyalty_discount =
            Decimal::new(self.default_loyalty_discount_cents, 2);
        ctx.pricing = stages::pricing::run(
            &ctx.basket.normalized_lines,
            &ctx.eligibility,
            &ctx.discount_type,
            ctx.age_gate.age_verified,
            default_loyalty_discount,
        );

        // S7 — Response Builder.
        ctx.response.receipt_lines = stages::response::run(
            &ctx.lid,
            &ctx.age_gate,
            &ctx.eligibility,
            &ctx.pricing,
        );

        let flags = ctx.transaction_flags();

        // Final durable write: transaction header + lines (spec.md §4.8,
        // §5 ordering — this is the last phase; a cancelled request must
        // not leave it half-written, hence the single transaction in
        // `TransactionRepository::append`).
        let summary = TransactionSummary {
            transaction_id: ctx.request.transaction_id.clone(),
            store_id: ctx.request.store_location_id.clone(),
            cashier_id: ctx.request.cashier_id.clone(),
            normalized_id: ctx.lid.normalized_id.clone(),
            tier3_eligible: flags.tier3_eligible,
            cid_fund_eligible: flags.cid_fund_eligible,
            age_verified: flags.age_verified,
            eaiv_verified: flags.eaiv_verified,
            total_discount: ctx.pricing.total_discount,
            created_at: now,
        };
        self.store
            .transactions()
            .append(&summary, &ctx.pricing.priced_lines)
            .await?;

        Ok(DecisionResult {
            rewards: ctx.pricing.rewards,
            receipt_lines: ctx.response.receipt_lines,
            flags,
        })
    }
}
