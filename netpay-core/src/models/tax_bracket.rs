use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One row of a progressive quick-lookup schedule.
///
/// A taxable amount strictly greater than `lower_bound` falls into this
/// bracket (unless a higher bracket also matches), and is taxed as
/// `amount * rate - quick_subtractor`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxBracket {
    pub lower_bound: Decimal,
    pub rate: Decimal,
    pub quick_subtractor: Decimal,
}

impl TaxBracket {
    pub fn new(
        lower_bound: Decimal,
        rate: Decimal,
        quick_subtractor: Decimal,
    ) -> Self {
        Self {
            lower_bound,
            rate,
            quick_subtractor,
        }
    }
}

/// Result of a bracket lookup: the rate and quick subtractor to apply.
///
/// Amounts at or below zero match no bracket and yield [`BracketMatch::NONE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BracketMatch {
    pub rate: Decimal,
    pub quick_subtractor: Decimal,
}

impl BracketMatch {
    pub const NONE: Self = Self {
        rate: Decimal::ZERO,
        quick_subtractor: Decimal::ZERO,
    };

    pub fn is_none(&self) -> bool {
        self.rate.is_zero() && self.quick_subtractor.is_zero()
    }
}

impl From<&TaxBracket> for BracketMatch {
    fn from(bracket: &TaxBracket) -> Self {
        Self {
            rate: bracket.rate,
            quick_subtractor: bracket.quick_subtractor,
        }
    }
}
