//! Progressive income-tax schedule using the quick-subtractor method.
//!
//! Each bracket stores a `lower_bound`, a marginal `rate`, and a
//! `quick_subtractor`. For a taxable amount `x` in a bracket,
//! `x * rate - quick_subtractor` equals the tax obtained by taxing every
//! lower slice of `x` at its own marginal rate. The subtractor of bracket
//! `i` is therefore fixed by the bracket below it:
//!
//! ```text
//! subtractor[i] = subtractor[i - 1] + lower_bound[i] * (rate[i] - rate[i - 1])
//! ```
//!
//! # Default schedule
//!
//! | Lower bound | Rate | Quick subtractor |
//! |-------------|------|------------------|
//! | 80000       | 45%  | 13505            |
//! | 55000       | 35%  | 5505             |
//! | 35000       | 30%  | 2755             |
//! | 9000        | 25%  | 1005             |
//! | 4500        | 20%  | 555              |
//! | 1500        | 10%  | 105              |
//! | 0           | 3%   | 0                |
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use netpay_core::TaxTable;
//!
//! let table = TaxTable::default();
//! let bracket = table.lookup(dec!(5450));
//!
//! assert_eq!(bracket.rate, dec!(0.20));
//! assert_eq!(bracket.quick_subtractor, dec!(555));
//! assert_eq!(table.tax_for(dec!(5450)), dec!(535.00));
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::{BracketMatch, TaxBracket};

/// `(lower_bound, rate in percent, quick_subtractor)`, descending.
const DEFAULT_SCHEDULE: [(i64, i64, i64); 7] = [
    (80000, 45, 13505),
    (55000, 35, 5505),
    (35000, 30, 2755),
    (9000, 25, 1005),
    (4500, 20, 555),
    (1500, 10, 105),
    (0, 3, 0),
];

/// Errors raised when a custom schedule is not a valid progressive table.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TaxTableError {
    /// The schedule contains no brackets.
    #[error("tax table has no brackets")]
    Empty,

    /// Brackets must be strictly descending by lower bound.
    #[error("bracket {index} lower bound {lower_bound} is not below the previous bracket")]
    NotDescending { index: usize, lower_bound: Decimal },

    /// The lowest bracket must start at zero so positive amounts always match.
    #[error("lowest bracket must start at 0, got {0}")]
    LowestBoundNotZero(Decimal),

    /// Rates must lie in (0, 1].
    #[error("bracket {index} rate must be in (0, 1], got {rate}")]
    InvalidRate { index: usize, rate: Decimal },

    /// Quick subtractors must reproduce cumulative marginal taxation.
    #[error("bracket {index} quick subtractor should be {expected}, got {actual}")]
    InconsistentSubtractor {
        index: usize,
        expected: Decimal,
        actual: Decimal,
    },
}

/// An ordered (descending by lower bound) progressive tax schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawTaxTable")]
pub struct TaxTable {
    brackets: Vec<TaxBracket>,
}

impl Default for TaxTable {
    fn default() -> Self {
        Self {
            brackets: DEFAULT_SCHEDULE
                .iter()
                .map(|&(lower_bound, percent, subtractor)| {
                    TaxBracket::new(
                        Decimal::from(lower_bound),
                        Decimal::new(percent, 2),
                        Decimal::from(subtractor),
                    )
                })
                .collect(),
        }
    }
}

impl TaxTable {
    /// Builds a validated schedule from brackets sorted descending by
    /// `lower_bound`.
    ///
    /// # Errors
    ///
    /// Returns [`TaxTableError`] if the list is empty, not strictly
    /// descending, does not bottom out at zero, has a rate outside (0, 1],
    /// or carries a quick subtractor inconsistent with the rates below it.
    pub fn new(brackets: Vec<TaxBracket>) -> Result<Self, TaxTableError> {
        let lowest = brackets.last().ok_or(TaxTableError::Empty)?;
        if !lowest.lower_bound.is_zero() {
            return Err(TaxTableError::LowestBoundNotZero(lowest.lower_bound));
        }

        for (index, bracket) in brackets.iter().enumerate() {
            if bracket.rate <= Decimal::ZERO || bracket.rate > Decimal::ONE {
                return Err(TaxTableError::InvalidRate {
                    index,
                    rate: bracket.rate,
                });
            }
            if index > 0 && bracket.lower_bound >= brackets[index - 1].lower_bound {
                return Err(TaxTableError::NotDescending {
                    index,
                    lower_bound: bracket.lower_bound,
                });
            }
        }

        // Walk upwards from the zero bracket; the subtractor there must be 0.
        let mut expected = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;
        for (index, bracket) in brackets.iter().enumerate().rev() {
            expected += bracket.lower_bound * (bracket.rate - previous_rate);
            if bracket.quick_subtractor != expected {
                return Err(TaxTableError::InconsistentSubtractor {
                    index,
                    expected,
                    actual: bracket.quick_subtractor,
                });
            }
            previous_rate = bracket.rate;
        }

        Ok(Self { brackets })
    }

    /// Builds a schedule from `(lower_bound, rate)` pairs in any order,
    /// deriving each quick subtractor.
    ///
    /// # Errors
    ///
    /// Same as [`TaxTable::new`], except that subtractors are always
    /// consistent.
    pub fn from_marginal_rates(rates: &[(Decimal, Decimal)]) -> Result<Self, TaxTableError> {
        let mut ascending = rates.to_vec();
        ascending.sort_by(|a, b| a.0.cmp(&b.0));

        let mut subtractor = Decimal::ZERO;
        let mut previous_rate = Decimal::ZERO;
        let mut brackets = Vec::with_capacity(ascending.len());
        for (lower_bound, rate) in ascending {
            subtractor += lower_bound * (rate - previous_rate);
            previous_rate = rate;
            brackets.push(TaxBracket::new(lower_bound, rate, subtractor));
        }
        brackets.reverse();

        Self::new(brackets)
    }

    pub fn brackets(&self) -> &[TaxBracket] {
        &self.brackets
    }

    /// Finds the bracket with the greatest lower bound strictly below
    /// `taxable_amount`.
    ///
    /// Amounts at or below zero match nothing and return
    /// [`BracketMatch::NONE`]. An amount exactly on a boundary stays in the
    /// lower bracket.
    pub fn lookup(
        &self,
        taxable_amount: Decimal,
    ) -> BracketMatch {
        self.brackets
            .iter()
            .find(|bracket| taxable_amount > bracket.lower_bound)
            .map(BracketMatch::from)
            .unwrap_or(BracketMatch::NONE)
    }

    /// Tax owed on `taxable_amount` via the quick-subtractor formula.
    /// Unrounded.
    pub fn tax_for(
        &self,
        taxable_amount: Decimal,
    ) -> Decimal {
        let bracket = self.lookup(taxable_amount);
        if bracket.is_none() {
            return Decimal::ZERO;
        }
        taxable_amount * bracket.rate - bracket.quick_subtractor
    }

    /// Tax owed on `taxable_amount` by summing each slice at its marginal
    /// rate. Slower than [`TaxTable::tax_for`] but independent of the
    /// subtractors; the two always agree for a valid table.
    pub fn marginal_tax(
        &self,
        taxable_amount: Decimal,
    ) -> Decimal {
        let mut remaining_top = taxable_amount;
        let mut tax = Decimal::ZERO;
        for bracket in &self.brackets {
            if remaining_top > bracket.lower_bound {
                tax += (remaining_top - bracket.lower_bound) * bracket.rate;
                remaining_top = bracket.lower_bound;
            }
        }
        tax
    }
}

#[derive(Deserialize)]
struct RawTaxTable {
    brackets: Vec<TaxBracket>,
}

impl TryFrom<RawTaxTable> for TaxTable {
    type Error = TaxTableError;

    fn try_from(raw: RawTaxTable) -> Result<Self, Self::Error> {
        Self::new(raw.brackets)
    }
}
