//! Decimal money helpers. All monetary fields use `rust_decimal::Decimal`
//! rather than floating point so the half-up rounding spec.md requires at
//! the final-summation boundary is exact, not an approximation.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round to 2 decimal places, half away from zero ("half up" for the
/// non-negative amounts this engine only ever deals in).
pub fn round2(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

/// Clamp a value to be non-negative.
pub fn non_negative(value: Decimal) -> Decimal {
    value.max(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rounds_half_up_at_midpoint() {
        assert_eq!(round2(dec!(1.005)), dec!(1.01));
        assert_eq!(round2(dec!(1.004)), dec!(1.00));
    }

    #[test]
    fn clamps_negative_to_zero() {
        assert_eq!(non_negative(dec!(-0.01)), Decimal::ZERO);
        assert_eq!(non_negative(dec!(0.5)), dec!(0.5));
    }
}
