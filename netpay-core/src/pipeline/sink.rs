use async_trait::async_trait;
use thiserror::Error;

use crate::ResultRecord;

/// Errors a [`ResultSink`] can raise. All are fatal to the run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SinkError {
    #[error("output write error: {0}")]
    Write(String),

    #[error("output flush error: {0}")]
    Flush(String),

    #[error("could not discard partial output: {0}")]
    Discard(String),
}

/// Consumes result records in the order the pipeline delivers them.
///
/// Exactly one of [`finish`](ResultSink::finish) or
/// [`discard`](ResultSink::discard) is called after the last write.
#[async_trait]
pub trait ResultSink: Send {
    /// Appends one record.
    async fn write(
        &mut self,
        record: &ResultRecord,
    ) -> Result<(), SinkError>;

    /// Flushes everything written. Called once after a successful run.
    async fn finish(&mut self) -> Result<(), SinkError>;

    /// Drops whatever was written so far. Called once after a failed run.
    async fn discard(&mut self) -> Result<(), SinkError> {
        Ok(())
    }
}
