use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when insurance parameters violate their invariants.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InsuranceParametersError {
    /// The contribution base floor must be non-negative.
    #[error("insurance base floor must be non-negative, got {0}")]
    NegativeFloor(Decimal),

    /// The contribution base ceiling must not be below the floor.
    #[error("insurance base ceiling {ceiling} is below floor {floor}")]
    CeilingBelowFloor { floor: Decimal, ceiling: Decimal },

    /// The combined contribution rate must be non-negative.
    #[error("combined insurance rate must be non-negative, got {0}")]
    NegativeRate(Decimal),

    /// The largest possible contribution must fit in a `Decimal` with room
    /// to subtract it from any gross income.
    #[error("insurance ceiling {ceiling} at rate {rate} exceeds the representable range")]
    ContributionOutOfRange { ceiling: Decimal, rate: Decimal },
}

/// Resolved social-insurance configuration for one run.
///
/// Gross income is clamped to `[base_floor, base_ceiling]` to obtain the
/// contribution base, which is then multiplied by `combined_rate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawInsuranceParameters")]
pub struct InsuranceParameters {
    base_floor: Decimal,
    base_ceiling: Decimal,
    combined_rate: Decimal,
}

impl InsuranceParameters {
    /// Builds a validated parameter set.
    ///
    /// # Errors
    ///
    /// Returns [`InsuranceParametersError`] if:
    /// - `base_floor` is negative
    /// - `base_ceiling` is below `base_floor`
    /// - `combined_rate` is negative
    /// - `base_ceiling * combined_rate` overflows, or cannot be subtracted
    ///   from the lowest `i64` gross income
    pub fn new(
        base_floor: Decimal,
        base_ceiling: Decimal,
        combined_rate: Decimal,
    ) -> Result<Self, InsuranceParametersError> {
        if base_floor < Decimal::ZERO {
            return Err(InsuranceParametersError::NegativeFloor(base_floor));
        }
        if base_ceiling < base_floor {
            return Err(InsuranceParametersError::CeilingBelowFloor {
                floor: base_floor,
                ceiling: base_ceiling,
            });
        }
        if combined_rate < Decimal::ZERO {
            return Err(InsuranceParametersError::NegativeRate(combined_rate));
        }
        base_ceiling
            .checked_mul(combined_rate)
            .and_then(|contribution| Decimal::from(i64::MIN).checked_sub(contribution))
            .ok_or(InsuranceParametersError::ContributionOutOfRange {
                ceiling: base_ceiling,
                rate: combined_rate,
            })?;

        Ok(Self {
            base_floor,
            base_ceiling,
            combined_rate,
        })
    }

    /// Builds parameters from individual contribution-rate components,
    /// summing them into the combined rate.
    ///
    /// # Errors
    ///
    /// Same as [`InsuranceParameters::new`].
    pub fn from_components<I>(
        base_floor: Decimal,
        base_ceiling: Decimal,
        rates: I,
    ) -> Result<Self, InsuranceParametersError>
    where
        I: IntoIterator<Item = Decimal>,
    {
        Self::new(base_floor, base_ceiling, rates.into_iter().sum())
    }

    pub fn base_floor(&self) -> Decimal {
        self.base_floor
    }

    pub fn base_ceiling(&self) -> Decimal {
        self.base_ceiling
    }

    pub fn combined_rate(&self) -> Decimal {
        self.combined_rate
    }
}

#[derive(Deserialize)]
struct RawInsuranceParameters {
    base_floor: Decimal,
    base_ceiling: Decimal,
    combined_rate: Decimal,
}

impl TryFrom<RawInsuranceParameters> for InsuranceParameters {
    type Error = InsuranceParametersError;

    fn try_from(raw: RawInsuranceParameters) -> Result<Self, Self::Error> {
        Self::new(raw.base_floor, raw.base_ceiling, raw.combined_rate)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn new_accepts_valid_parameters() {
        let params = InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0.105)).unwrap();

        assert_eq!(params.base_floor(), dec!(3000));
        assert_eq!(params.base_ceiling(), dec!(20000));
        assert_eq!(params.combined_rate(), dec!(0.105));
    }

    #[test]
    fn new_accepts_equal_floor_and_ceiling() {
        let result = InsuranceParameters::new(dec!(5000), dec!(5000), dec!(0.1));

        assert!(result.is_ok());
    }

    #[test]
    fn new_rejects_negative_floor() {
        let result = InsuranceParameters::new(dec!(-1), dec!(20000), dec!(0.105));

        assert_eq!(result, Err(InsuranceParametersError::NegativeFloor(dec!(-1))));
    }

    #[test]
    fn new_rejects_ceiling_below_floor() {
        let result = InsuranceParameters::new(dec!(3000), dec!(2999.99), dec!(0.105));

        assert_eq!(
            result,
            Err(InsuranceParametersError::CeilingBelowFloor {
                floor: dec!(3000),
                ceiling: dec!(2999.99),
            })
        );
    }

    #[test]
    fn new_rejects_negative_rate() {
        let result = InsuranceParameters::new(dec!(0), dec!(1), dec!(-0.01));

        assert_eq!(result, Err(InsuranceParametersError::NegativeRate(dec!(-0.01))));
    }

    #[test]
    fn from_components_sums_rates() {
        let params = InsuranceParameters::from_components(
            dec!(2193.00),
            dec!(16446.00),
            [dec!(0.08), dec!(0.02), dec!(0.005), dec!(0), dec!(0), dec!(0.06)],
        )
        .unwrap();

        assert_eq!(params.combined_rate(), dec!(0.165));
    }

    #[test]
    fn new_rejects_contribution_that_overflows() {
        let result = InsuranceParameters::new(dec!(0), Decimal::MAX, dec!(2));

        assert_eq!(
            result,
            Err(InsuranceParametersError::ContributionOutOfRange {
                ceiling: Decimal::MAX,
                rate: dec!(2),
            })
        );
    }

    #[test]
    fn new_rejects_contribution_with_no_room_below_gross() {
        let result = InsuranceParameters::new(dec!(0), Decimal::MAX, dec!(1));

        assert!(matches!(
            result,
            Err(InsuranceParametersError::ContributionOutOfRange { .. })
        ));
    }

    #[test]
    fn new_accepts_large_but_representable_contribution() {
        let result = InsuranceParameters::new(dec!(0), dec!(100000000000000000000), dec!(1.5));

        assert!(result.is_ok());
    }

    // ── deserialization ──────────────────────────────────────────────────
    #[test]
    fn deserialize_accepts_valid_parameters() {
        let params: InsuranceParameters = toml::from_str(
            r#"
            base_floor = "3000"
            base_ceiling = "20000"
            combined_rate = "0.105"
            "#,
        )
        .unwrap();

        assert_eq!(
            params,
            InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0.105)).unwrap()
        );
    }

    #[test]
    fn deserialize_rejects_ceiling_below_floor() {
        let result = toml::from_str::<InsuranceParameters>(
            r#"
            base_floor = "3000"
            base_ceiling = "100"
            combined_rate = "0.105"
            "#,
        );

        let err = result.unwrap_err();
        assert!(err.to_string().contains("below floor"), "{err}");
    }
}
