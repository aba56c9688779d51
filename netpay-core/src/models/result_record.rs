use chrono::{DateTime, Local};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Format used for [`ResultRecord::computed_at`] in output rows.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Net-of-tax result for one employee.
///
/// Monetary fields are already rounded to two decimal places.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Copied from the originating [`IncomeRecord`](crate::IncomeRecord).
    /// Not part of the output row.
    #[serde(skip)]
    pub sequence: u64,
    pub employee_id: String,
    pub gross_income: i64,
    pub insurance_withheld: Decimal,
    pub tax_withheld: Decimal,
    pub net_pay: Decimal,
    pub computed_at: DateTime<Local>,
}

impl ResultRecord {
    /// Renders the record as the six output columns:
    /// `employee_id, gross_income, insurance, tax, net_pay, computed_at`.
    pub fn to_row(&self) -> [String; 6] {
        [
            self.employee_id.clone(),
            self.gross_income.to_string(),
            format!("{:.2}", self.insurance_withheld),
            format!("{:.2}", self.tax_withheld),
            format!("{:.2}", self.net_pay),
            self.computed_at.format(TIMESTAMP_FORMAT).to_string(),
        ]
    }
}
