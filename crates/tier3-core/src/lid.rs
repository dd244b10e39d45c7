//! Loyalty ID parsing: phone numbers, RTNSmart QR codes, and invalid input.
//!
//! This module only covers *format* classification (spec.md §3/§4.1 steps
//! 1-3). The daily-count upsert, cap check, and manager-card decision are
//! stateful and live in `tier3-pipeline::stages::lid` since they require
//! the persistence layer.

use serde::{Deserialize, Serialize};

pub const QR_BASE_PREFIX: &str = "https://rtnsmart.com/rtnsmartapp/?USER_";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FormatType {
    PhoneNumber,
    QrCode,
}

/// A parsed loyalty identifier. `normalized_id` (when `Phone`/`QR`) is the
/// exact string used as the storage key everywhere downstream — phone and
/// QR forms of the same human are distinct entities by design.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoyaltyId {
    Phone(String),
    Qr(String),
    Invalid(String),
}

impl LoyaltyId {
    /// Classify a raw loyalty string per spec.md §4.1 steps 1-3.
    pub fn parse(raw: &str) -> LoyaltyId {
        if raw.trim().is_empty() {
            return LoyaltyId::Invalid("LoyaltyID is missing".to_string());
        }

        if let Some(suffix) = raw.strip_prefix(QR_BASE_PREFIX) {
            return if !suffix.is_empty() && is_valid_qr_payload(suffix) {
                LoyaltyId::Qr(raw.to_string())
            } else {
                LoyaltyId::Invalid(
                    "LoyaltyID QR code format invalid: invalid URL or encoded parameter"
                        .to_string(),
                )
            };
        }

        if raw.chars().all(|c| c.is_ascii_digit()) {
            let len = raw.len();
            return if (10..=12).contains(&len) {
                LoyaltyId::Phone(raw.to_string())
            } else {
                LoyaltyId::Invalid(format!(
                    "LoyaltyID format invalid: length {len} not in range [10, 12]"
                ))
            };
        }

        LoyaltyId::Invalid(
            "LoyaltyID format unrecognized (must be phone number or RTNSmart QR code)"
                .to_string(),
        )
    }

    pub fn normalized_id(&self) -> Option<&str> {
        match self {
            LoyaltyId::Phone(id) | LoyaltyId::Qr(id) => Some(id),
            LoyaltyId::Invalid(_) => None,
        }
    }

    pub fn format_type(&self) -> Option<FormatType> {
        match self {
            LoyaltyId::Phone(_) => Some(FormatType::PhoneNumber),
            LoyaltyId::Qr(_) => Some(FormatType::QrCode),
            LoyaltyId::Invalid(_) => None,
        }
    }

    pub fn is_valid(&self) -> bool {
        !matches!(self, LoyaltyId::Invalid(_))
    }
}

fn is_valid_qr_payload(payload: &str) -> bool {
    payload
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '/' | '='))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_lid_is_invalid() {
        let lid = LoyaltyId::parse("");
        assert!(!lid.is_valid());
        match lid {
            LoyaltyId::Invalid(reason) => assert_eq!(reason, "LoyaltyID is missing"),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn whitespace_only_is_missing() {
        let lid = LoyaltyId::parse("   ");
        assert!(!lid.is_valid());
    }

    #[test]
    fn valid_phone_10_digits() {
        let lid = LoyaltyId::parse("5551234567");
        assert_eq!(lid, LoyaltyId::Phone("5551234567".to_string()));
        assert_eq!(lid.format_type(), Some(FormatType::PhoneNumber));
    }

    #[test]
    fn phone_length_out_of_range() {
        let lid = LoyaltyId::parse("123456789");
        match lid {
            LoyaltyId::Invalid(reason) => {
                assert!(reason.contains("length 9 not in range [10, 12]"));
            }
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn valid_qr_code() {
        let raw = format!("{QR_BASE_PREFIX}YWJjMTIz");
        let lid = LoyaltyId::parse(&raw);
        assert_eq!(lid, LoyaltyId::Qr(raw));
    }

    #[test]
    fn bad_qr_code_payload() {
        let raw = format!("{QR_BASE_PREFIX}@@@");
        let lid = LoyaltyId::parse(&raw);
        match lid {
            LoyaltyId::Invalid(reason) => assert!(reason.contains("QR code format invalid")),
            _ => panic!("expected invalid"),
        }
    }

    #[test]
    fn empty_qr_suffix_is_invalid() {
        let lid = LoyaltyId::parse(QR_BASE_PREFIX);
        assert!(!lid.is_valid());
    }

    #[test]
    fn unrecognized_format() {
        let lid = LoyaltyId::parse("abc-not-a-lid");
        match lid {
            LoyaltyId::Invalid(reason) => assert!(reason.contains("unrecognized")),
            _ => panic!("expected invalid"),
        }
    }
}
