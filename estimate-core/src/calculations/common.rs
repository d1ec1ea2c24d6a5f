//! Shared rounding helpers for money amounts.

use rust_decimal::{Decimal, RoundingStrategy};

/// Number of decimal places money amounts are carried with.
pub const MONEY_SCALE: u32 = 2;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded away from zero. The result always
/// carries two decimal places, so `500` comes back as `500.00`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use estimate_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
/// assert_eq!(round_half_up(dec!(500)).to_string(), "500.00");
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(MONEY_SCALE);
    rounded
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        let result = round_half_up(dec!(138.004));

        assert_eq!(result, dec!(138.00));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        let result = round_half_up(dec!(0.125));

        assert_eq!(result, dec!(0.13));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        let result = round_half_up(dec!(-0.125));

        assert_eq!(result, dec!(-0.13));
    }

    #[test]
    fn round_half_up_pads_whole_numbers_to_two_places() {
        let result = round_half_up(dec!(500));

        assert_eq!(result.scale(), 2);
        assert_eq!(result.to_string(), "500.00");
    }

    #[test]
    fn round_half_up_handles_zero() {
        let result = round_half_up(Decimal::ZERO);

        assert_eq!(result.to_string(), "0.00");
    }

    #[test]
    fn round_half_up_carries_into_the_next_unit() {
        let result = round_half_up(dec!(999999.999));

        assert_eq!(result, dec!(1000000.00));
    }
}
