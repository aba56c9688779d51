use async_trait::async_trait;
use thiserror::Error;

use crate::IncomeRecord;

/// Errors a [`RecordSource`] can raise. All are fatal to the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceError {
    /// A line could not be turned into an [`IncomeRecord`].
    #[error("invalid input on line {line}: {reason}")]
    Parse { line: u64, reason: String },

    /// The underlying medium could not be read.
    #[error("input read error: {0}")]
    Read(String),
}

/// Produces income records in input order, then reports exhaustion.
#[async_trait]
pub trait RecordSource: Send {
    /// Returns the next record, or `None` once no further records exist.
    ///
    /// The `sequence` field of returned records is overwritten by the
    /// pipeline with the emission index.
    async fn next_record(&mut self) -> Result<Option<IncomeRecord>, SourceError>;
}
