//! S1 — LID Validator. Format classification lives in `tier3_core::lid`;
//! this stage adds the stateful parts: the daily-count upsert, the
//! manager-card threshold, and the profile/validation-log writes
//! (spec.md §4.1, §4.8).

use chrono::{DateTime, Utc};
use tier3_core::lid::LoyaltyId;
use tier3_core::EngineResult;
use tier3_persistence::repositories::ValidationLogEntry;
use tier3_persistence::Store;
use tracing::warn;

use crate::context::LidOutcome;

pub async fn run(
    store: &Store,
    raw_loyalty_id: &str,
    store_id: &str,
    today: chrono::NaiveDate,
    now: DateTime<Utc>,
    daily_cap: i64,
) -> EngineResult<LidOutcome> {
    let parsed = LoyaltyId::parse(raw_loyalty_id);

    if !parsed.is_valid() {
        let reason = match &parsed {
            LoyaltyId::Invalid(reason) => reason.clone(),
            _ => unreachable!(),
        };
        log_attempt(store, raw_loyalty_id, None, store_id, false, false, &reason, now).await;
        return Ok(LidOutcome {
            valid: false,
            eligible_for_tier3: false,
            eligible_for_cid_fund: false,
            is_manager_card: false,
            normalized_id: None,
            format_type: None,
            daily_count: 0,
            reason,
        });
    }

    let normalized_id = parsed
        .normalized_id()
        .expect("parsed.is_valid() guarantees normalized_id")
        .to_string();
    let format_type = parsed.format_type().expect("valid lid has a format type");

    // Per-LID serialization: daily-count upsert, profile upsert, and the
    // manager-card decision must all observe the same post-increment
    // count for this request (spec.md §5).
    let _guard = store.lock_lid(&normalized_id).await;

    let daily_count = store
        .daily_counts()
        .increment_and_get(&normalized_id, today)
        .await?;

    let is_manager_card = daily_count > daily_cap;
    let (eligible_for_cid_fund, reason) = if is_manager_card {
        (
            false,
            format!(
                "Manager/store card detected: {daily_count} transactions today (exceeds cap of {daily_cap})"
            ),
        )
    } else {
        (true, String::new())
    };

    store
        .profiles()
        .upsert_seen(&normalized_id, store_id, format_type, is_manager_card, now)
        .await?;

    log_attempt(
        store,
        raw_loyalty_id,
        Some(&normalized_id),
        store_id,
        true,
        is_manager_card,
        &reason,
        now,
    )
    .await;

    Ok(LidOutcome {
        valid: true,
        eligible_for_tier3: true,
        eligible_for_cid_fund,
        is_manager_card,
        normalized_id: Some(normalized_id),
        format_type: Some(format_type),
        daily_count,
        reason,
    })
}

async fn log_attempt(
    store: &Store,
    raw_loyalty_id: &str,
    normalized_id: Option<&str>,
    store_id: &str,
    valid: bool,
    is_manager_card: bool,
    reason: &str,
    now: DateTime<Utc>,
) {
    let entry = ValidationLogEntry {
        occurred_at: now,
        raw_loyalty_id: raw_loyalty_id.to_string(),
        normalized_id: normalized_id.map(str::to_string),
        store_id: store_id.to_string(),
        valid,
        is_manager_card,
        reason: reason.to_string(),
    };
    if let Err(e) = store.validation_log().append(&entry).await {
        warn!(error = %e, "validation log append failed");
    }
}
