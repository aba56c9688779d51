//! Net pay calculations: progressive tax lookup, social-insurance
//! withholding, and the per-record engine combining the two.

pub mod common;
pub mod engine;
pub mod insurance;
pub mod tax_table;

pub use engine::{DEFAULT_INCOME_TAX_START_POINT, TaxEngine};
pub use insurance::compute_insurance;
pub use tax_table::{TaxTable, TaxTableError};
