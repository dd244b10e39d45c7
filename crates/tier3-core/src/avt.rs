use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Append-only audit row, written iff the cashier confirmed age for this
/// transaction. Every record has `avt_performed = true` and a non-null
/// timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AvtRecord {
    pub transaction_id: String,
    pub store_id: String,
    pub loyalty_id: Option<String>,
    pub cid_customer_id: Option<String>,
    pub avt_performed: bool,
    pub avt_method: String,
    pub avt_timestamp: DateTime<Utc>,
    pub cashier_id: Option<String>,
    pub eaiv_verified: Option<bool>,
}

pub const AVT_METHOD_IN_PERSON: &str = "in_person_confirmation";

impl AvtRecord {
    pub fn new(
        transaction_id: String,
        store_id: String,
        loyalty_id: Option<String>,
        cid_customer_id: Option<String>,
        cashier_id: Option<String>,
        eaiv_verified: Option<bool>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            transaction_id,
            store_id,
            loyalty_id,
            cid_customer_id,
            avt_performed: true,
            avt_method: AVT_METHOD_IN_PERSON.to_string(),
            avt_timestamp: timestamp,
            cashier_id,
            eaiv_verified,
        }
    }
}
