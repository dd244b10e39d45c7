//! S2 — Age Gate (spec.md §4.2).

use chrono::{DateTime, Utc};
use tier3_core::avt::AvtRecord;
use tier3_core::EngineResult;
use tier3_persistence::Store;

use crate::context::{AgeGateOutcome, AvtStatus, LidOutcome};

pub async fn run(
    store: &Store,
    avt_status: AvtStatus,
    lid: &LidOutcome,
    transaction_id: &str,
    store_id: &str,
    cashier_id: Option<&str>,
    now: DateTime<Utc>,
) -> EngineResult<AgeGateOutcome> {
    let age_verified = avt_status == AvtStatus::Verified;

    // EAIV is read from the profile, never from the POS. Missing LID
    // means no profile, so eaiv_verified is false.
    let profile = match &lid.normalized_id {
        Some(normalized_id) => store.profiles().get(normalized_id).await?,
        None => None,
    };
    let eaiv_verified = profile.as_ref().map(|p| p.eaiv_verified).unwrap_or(false);
    let cid_customer_id = profile.as_ref().map(|p| p.cid_customer_id.clone());

    let reason = if age_verified {
        String::new()
    } else {
        "Age verification not confirmed by cashier".to_string()
    };

    if age_verified && !transaction_id.is_empty() && !store_id.is_empty() {
        let record = AvtRecord::new(
            transaction_id.to_string(),
            store_id.to_string(),
            lid.normalized_id.clone(),
            cid_customer_id,
            cashier_id.map(str::to_string),
            Some(eaiv_verified),
            now,
        );
        // Fatal: the AVT audit trail is legally required (spec.md §4.2/§7).
        store.avt().append(&record).await?;
    }

    Ok(AgeGateOutcome {
        age_verified,
        eaiv_verified,
        eligible_for_tier3_incentives: age_verified,
        eligible_for_eaiv_only_incentives: age_verified && eaiv_verified,
        reason,
    })
}
