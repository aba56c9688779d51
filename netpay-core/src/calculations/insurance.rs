//! Social-insurance withholding.
//!
//! The contribution base is gross income clamped to the configured floor and
//! ceiling; withholding is that base times the combined contribution rate.

use rust_decimal::Decimal;

use crate::InsuranceParameters;
use crate::calculations::common::clamp;

/// Social insurance withheld from `gross_income`. Unrounded.
///
/// # Example
///
/// ```
/// use rust_decimal_macros::dec;
/// use netpay_core::InsuranceParameters;
/// use netpay_core::calculations::compute_insurance;
///
/// let params = InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0.105)).unwrap();
///
/// assert_eq!(compute_insurance(dec!(2000), &params), dec!(315.000));
/// assert_eq!(compute_insurance(dec!(50000), &params), dec!(2100.000));
/// ```
pub fn compute_insurance(
    gross_income: Decimal,
    params: &InsuranceParameters,
) -> Decimal {
    let base = clamp(gross_income, params.base_floor(), params.base_ceiling());
    // InsuranceParameters::new bounds base_ceiling * combined_rate.
    base * params.combined_rate()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    fn params() -> InsuranceParameters {
        InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0.105)).unwrap()
    }

    #[test]
    fn extreme_income_with_large_bounds_does_not_overflow() {
        let params =
            InsuranceParameters::new(dec!(0), dec!(100000000000000000000), dec!(1.5)).unwrap();

        assert_eq!(
            compute_insurance(Decimal::from(i64::MAX), &params),
            dec!(150000000000000000000)
        );
    }

    #[test]
    fn income_within_range_is_used_directly() {
        assert_eq!(compute_insurance(dec!(10000), &params()), dec!(1050.00));
    }

    #[test]
    fn income_below_floor_uses_floor() {
        assert_eq!(compute_insurance(dec!(2000), &params()), dec!(315.00));
    }

    #[test]
    fn zero_income_still_pays_floor_contribution() {
        assert_eq!(compute_insurance(dec!(0), &params()), dec!(315.00));
    }

    #[test]
    fn income_above_ceiling_uses_ceiling() {
        assert_eq!(compute_insurance(dec!(50000), &params()), dec!(2100.00));
    }

    #[test]
    fn income_on_boundaries_is_not_adjusted() {
        assert_eq!(compute_insurance(dec!(3000), &params()), dec!(315.00));
        assert_eq!(compute_insurance(dec!(20000), &params()), dec!(2100.00));
    }

    #[test]
    fn zero_rate_withholds_nothing() {
        let params = InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0)).unwrap();

        assert_eq!(compute_insurance(dec!(12345), &params), dec!(0));
    }

    #[test]
    fn clamped_base_property_holds_across_range() {
        let params = params();
        let mut income = dec!(0);

        while income <= dec!(30000) {
            let expected = clamp(income, dec!(3000), dec!(20000)) * dec!(0.105);
            assert_eq!(compute_insurance(income, &params), expected);
            income += dec!(997);
        }
    }
}
