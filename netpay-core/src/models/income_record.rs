use serde::{Deserialize, Serialize};

/// One employee's gross income for the period, as read from the input stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncomeRecord {
    /// Position of the record in the input stream (0-based).
    pub sequence: u64,
    pub employee_id: String,
    pub gross_income: i64,
}

impl IncomeRecord {
    pub fn new(
        sequence: u64,
        employee_id: impl Into<String>,
        gross_income: i64,
    ) -> Self {
        Self {
            sequence,
            employee_id: employee_id.into(),
            gross_income,
        }
    }
}
