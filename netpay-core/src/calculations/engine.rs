//! Per-record net pay computation.
//!
//! | Step | Value |
//! |------|-------|
//! | 1    | Insurance withheld: gross clamped to the base range × combined rate |
//! | 2    | Real income: gross − insurance |
//! | 3    | Taxable amount: real income − income tax start point |
//! | 4    | Tax: quick-subtractor lookup on the taxable amount (0 when no bracket) |
//! | 5    | Net pay: real income − tax |
//!
//! Intermediate values are exact; rounding to two places happens once when
//! the [`ResultRecord`] is produced.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use netpay_core::{IncomeRecord, InsuranceParameters, TaxEngine, TaxTable};
//!
//! let params = InsuranceParameters::new(dec!(3000), dec!(20000), dec!(0.105)).unwrap();
//! let engine = TaxEngine::new(params, TaxTable::default());
//!
//! let result = engine.process(&IncomeRecord::new(0, "101", 10000));
//!
//! assert_eq!(result.insurance_withheld, dec!(1050.00));
//! assert_eq!(result.tax_withheld, dec!(535.00));
//! assert_eq!(result.net_pay, dec!(8415.00));
//! ```

use chrono::{DateTime, Local};
use rust_decimal::Decimal;

use crate::calculations::common::round_half_up;
use crate::calculations::insurance::compute_insurance;
use crate::calculations::tax_table::TaxTable;
use crate::{IncomeRecord, InsuranceParameters, ResultRecord};

/// Fixed exemption subtracted from real income before the bracket lookup.
pub const DEFAULT_INCOME_TAX_START_POINT: Decimal = Decimal::from_parts(3500, 0, 0, false, 0);

/// Computes insurance, tax, and net pay for individual income records.
///
/// Holds only immutable configuration, so one engine can be shared by any
/// number of workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxEngine {
    insurance: InsuranceParameters,
    tax_table: TaxTable,
    income_tax_start_point: Decimal,
}

impl TaxEngine {
    /// Creates an engine with the default income tax start point.
    pub fn new(
        insurance: InsuranceParameters,
        tax_table: TaxTable,
    ) -> Self {
        Self {
            insurance,
            tax_table,
            income_tax_start_point: DEFAULT_INCOME_TAX_START_POINT,
        }
    }

    /// Overrides the income tax start point.
    pub fn with_income_tax_start_point(
        mut self,
        start_point: Decimal,
    ) -> Self {
        self.income_tax_start_point = start_point;
        self
    }

    pub fn insurance(&self) -> &InsuranceParameters {
        &self.insurance
    }

    pub fn tax_table(&self) -> &TaxTable {
        &self.tax_table
    }

    pub fn income_tax_start_point(&self) -> Decimal {
        self.income_tax_start_point
    }

    /// Processes one record, stamping it with the current local time.
    pub fn process(
        &self,
        record: &IncomeRecord,
    ) -> ResultRecord {
        self.process_at(record, Local::now())
    }

    /// Processes one record with an explicit timestamp.
    pub fn process_at(
        &self,
        record: &IncomeRecord,
        computed_at: DateTime<Local>,
    ) -> ResultRecord {
        let gross = Decimal::from(record.gross_income);

        let insurance = compute_insurance(gross, &self.insurance);
        let real_income = gross - insurance;
        let taxable_amount = real_income - self.income_tax_start_point;
        let tax = self.tax_table.tax_for(taxable_amount);
        let net_pay = real_income - tax;

        ResultRecord {
            sequence: record.sequence,
            employee_id: record.employee_id.clone(),
            gross_income: record.gross_income,
            insurance_withheld: round_half_up(insurance),
            tax_withheld: round_half_up(tax),
            net_pay: round_half_up(net_pay),
            computed_at,
        }
    }
}
