//! Common utility functions for net pay calculations.

use rust_decimal::Decimal;

/// Rounds a decimal value to exactly two decimal places using half-up rounding.
///
/// Values at exactly 0.005 are rounded up to 0.01 (away from zero).
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use netpay_core::calculations::common::round_half_up;
///
/// assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
/// assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
/// assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46)); // Away from zero
/// ```
pub fn round_half_up(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(2, rust_decimal::RoundingStrategy::MidpointAwayFromZero)
}

/// Restricts `value` to the inclusive range `[low, high]`.
///
/// Callers guarantee `low <= high`.
///
/// # Examples
///
/// ```
/// use rust_decimal_macros::dec;
/// use netpay_core::calculations::common::clamp;
///
/// assert_eq!(clamp(dec!(2000), dec!(3000), dec!(20000)), dec!(3000));
/// assert_eq!(clamp(dec!(50000), dec!(3000), dec!(20000)), dec!(20000));
/// assert_eq!(clamp(dec!(10000), dec!(3000), dec!(20000)), dec!(10000));
/// ```
pub fn clamp(
    value: Decimal,
    low: Decimal,
    high: Decimal,
) -> Decimal {
    if value < low {
        low
    } else if value > high {
        high
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    // =========================================================================
    // round_half_up tests
    // =========================================================================

    #[test]
    fn round_half_up_rounds_down_below_midpoint() {
        assert_eq!(round_half_up(dec!(123.454)), dec!(123.45));
    }

    #[test]
    fn round_half_up_rounds_up_at_midpoint() {
        assert_eq!(round_half_up(dec!(123.455)), dec!(123.46));
    }

    #[test]
    fn round_half_up_handles_negative_values() {
        assert_eq!(round_half_up(dec!(-123.455)), dec!(-123.46));
    }

    #[test]
    fn round_half_up_preserves_already_rounded_values() {
        assert_eq!(round_half_up(dec!(1050.00)), dec!(1050.00));
    }

    #[test]
    fn round_half_up_drops_excess_scale() {
        let result = round_half_up(dec!(1050.000));

        assert_eq!(result, dec!(1050.00));
        assert_eq!(result.scale(), 2);
    }

    // =========================================================================
    // clamp tests
    // =========================================================================

    #[test]
    fn clamp_raises_value_below_low() {
        assert_eq!(clamp(dec!(-5), dec!(0), dec!(10)), dec!(0));
    }

    #[test]
    fn clamp_lowers_value_above_high() {
        assert_eq!(clamp(dec!(10.01), dec!(0), dec!(10)), dec!(10));
    }

    #[test]
    fn clamp_keeps_boundaries() {
        assert_eq!(clamp(dec!(0), dec!(0), dec!(10)), dec!(0));
        assert_eq!(clamp(dec!(10), dec!(0), dec!(10)), dec!(10));
    }

    #[test]
    fn clamp_handles_degenerate_range() {
        assert_eq!(clamp(dec!(7), dec!(5), dec!(5)), dec!(5));
    }
}
