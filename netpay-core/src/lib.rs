pub mod calculations;
pub mod models;
pub mod pipeline;

pub use calculations::{TaxEngine, TaxTable};
pub use models::*;
pub use pipeline::{Pipeline, PipelineConfig, PipelineError, PipelineSummary};
