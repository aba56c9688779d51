mod income_record;
mod insurance_parameters;
mod result_record;
mod tax_bracket;

pub use income_record::IncomeRecord;
pub use insurance_parameters::{InsuranceParameters, InsuranceParametersError};
pub use result_record::{ResultRecord, TIMESTAMP_FORMAT};
pub use tax_bracket::{BracketMatch, TaxBracket};
