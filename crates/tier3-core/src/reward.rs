use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One per line with `total_discount > 0`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reward {
    pub reward_id: String,
    pub line_number: i64,
    pub value: Decimal,
    pub short_desc: String,
    pub long_desc: String,
    pub bucket_tags: Vec<String>,
}

/// `"{line_number}-1-B2_S150"` — the `B2_S150` suffix is a campaign code
/// carried over unexamined from the source system (see spec.md §9 Open
/// Questions); kept verbatim since nothing in this engine's scope defines
/// an alternative.
pub fn reward_id(line_number: i64) -> String {
    format!("{line_number}-1-B2_S150")
}

pub fn truncate_desc(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        return s.to_string();
    }
    if max_len <= 1 {
        return "…".chars().take(max_len).collect();
    }
    let keep = max_len - 1;
    let truncated: String = s.chars().take(keep).collect();
    format!("{truncated}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reward_id_shape() {
        assert_eq!(reward_id(3), "3-1-B2_S150");
    }

    #[test]
    fn truncate_leaves_short_strings_alone() {
        assert_eq!(truncate_desc("LOYALTY SAVINGS", 32), "LOYALTY SAVINGS");
    }

    #[test]
    fn truncate_adds_ellipsis() {
        let long = "a".repeat(40);
        let result = truncate_desc(&long, 32);
        assert_eq!(result.chars().count(), 32);
        assert!(result.ends_with('…'));
    }
}
