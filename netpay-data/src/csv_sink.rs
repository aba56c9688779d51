//! CSV output for result records.
//!
//! Each row holds `employee_id, gross_income, insurance_withheld,
//! tax_withheld, net_pay, computed_at`, with monetary values at two decimal
//! places and the timestamp as `YYYY-MM-DD HH:MM:SS` local time. No header
//! row is written.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use netpay_core::ResultRecord;
use netpay_core::pipeline::{ResultSink, SinkError};
use tracing::debug;

/// Writes result rows to any writer.
///
/// [`ResultSink::discard`] cannot take back bytes already handed to an
/// arbitrary writer; use [`FileResultSink`] when partial output must vanish.
pub struct CsvResultSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvResultSink<W> {
    pub fn from_writer(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(writer),
        }
    }

    fn write_row(
        &mut self,
        record: &ResultRecord,
    ) -> Result<(), SinkError> {
        self.writer
            .write_record(record.to_row())
            .map_err(|e| SinkError::Write(e.to_string()))
    }

    fn flush(&mut self) -> Result<(), SinkError> {
        self.writer
            .flush()
            .map_err(|e| SinkError::Flush(e.to_string()))
    }

    /// Flushes and returns the underlying writer.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Flush`] if buffered rows cannot be written.
    pub fn into_inner(self) -> Result<W, SinkError> {
        self.writer
            .into_inner()
            .map_err(|e| SinkError::Flush(e.to_string()))
    }
}

#[async_trait]
impl<W: Write + Send> ResultSink for CsvResultSink<W> {
    async fn write(
        &mut self,
        record: &ResultRecord,
    ) -> Result<(), SinkError> {
        self.write_row(record)
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.flush()
    }
}

/// Writes result rows to a file and removes the file if the run is
/// discarded, so a failed run never leaves truncated output behind.
pub struct FileResultSink {
    path: PathBuf,
    inner: Option<CsvResultSink<File>>,
}

impl FileResultSink {
    /// Creates (or truncates) the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SinkError::Write`] when the file cannot be created.
    pub fn create(path: &Path) -> Result<Self, SinkError> {
        let file = File::create(path)
            .map_err(|e| SinkError::Write(format!("cannot create '{}': {e}", path.display())))?;

        Ok(Self {
            path: path.to_path_buf(),
            inner: Some(CsvResultSink::from_writer(file)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn inner(&mut self) -> Result<&mut CsvResultSink<File>, SinkError> {
        self.inner
            .as_mut()
            .ok_or_else(|| SinkError::Write(format!("'{}' was discarded", self.path.display())))
    }
}

#[async_trait]
impl ResultSink for FileResultSink {
    async fn write(
        &mut self,
        record: &ResultRecord,
    ) -> Result<(), SinkError> {
        self.inner()?.write_row(record)
    }

    async fn finish(&mut self) -> Result<(), SinkError> {
        self.inner()?.flush()
    }

    async fn discard(&mut self) -> Result<(), SinkError> {
        // Close the handle before unlinking.
        if self.inner.take().is_none() {
            return Ok(());
        }
        debug!(path = %self.path.display(), "removing partial output");
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(SinkError::Discard(format!(
                "cannot remove '{}': {e}",
                self.path.display()
            ))),
        }
    }
}
