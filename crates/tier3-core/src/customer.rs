use crate::lid::FormatType;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Loyalty customer profile, identified by normalized loyalty id.
///
/// Invariants: `first_seen` and `cid_customer_id` are immutable after
/// insert; `total_transactions` is monotonic and never negative;
/// `last_seen >= first_seen`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerProfile {
    pub normalized_id: String,
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub total_transactions: i64,
    pub is_manager_card: bool,
    pub store_id: String,
    pub format_type: FormatType,
    pub cid_customer_id: String,
    pub avt_verified: bool,
    pub eaiv_verified: bool,
    pub last_avt_verified: Option<DateTime<Utc>>,
    pub last_eaiv_verified: Option<DateTime<Utc>>,
}

impl CustomerProfile {
    /// Build a fresh profile for first sighting at `store_id`.
    pub fn new_insert(
        normalized_id: String,
        store_id: String,
        format_type: FormatType,
        cid_customer_id: String,
        seen_at: DateTime<Utc>,
    ) -> Self {
        Self {
            normalized_id,
            first_seen: seen_at,
            last_seen: seen_at,
            total_transactions: 1,
            is_manager_card: false,
            store_id,
            format_type,
            cid_customer_id,
            avt_verified: false,
            eaiv_verified: false,
            last_avt_verified: None,
            last_eaiv_verified: None,
        }
    }
}

/// Unique per `(loyalty_id, date)`. Monotonic, never decremented.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: i64,
}
