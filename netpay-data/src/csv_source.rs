//! Line-oriented income record reader.
//!
//! ## Input format
//!
//! One record per line, no header row:
//!
//! ```csv
//! 101,10000
//! 102,2000
//! ```
//!
//! | Field          | Type    | Notes                                        |
//! |----------------|---------|----------------------------------------------|
//! | `employee_id`  | string  | Non-empty, opaque                            |
//! | `gross_income` | integer | Base 10, no currency symbol or separators    |
//!
//! Surrounding whitespace is ignored and blank lines are skipped. Any other
//! deviation is a fatal [`SourceError::Parse`].

use std::fs::File;
use std::io::Read;
use std::path::Path;

use async_trait::async_trait;
use netpay_core::IncomeRecord;
use netpay_core::pipeline::{RecordSource, SourceError};

/// Reads `employee_id,gross_income` lines from any reader.
///
/// An empty line carries no fields and is skipped rather than reported as a
/// field-count error.
pub struct CsvRecordSource<R> {
    reader: csv::Reader<R>,
    buffer: csv::StringRecord,
    emitted: u64,
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(reader: R) -> Self {
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .trim(csv::Trim::All)
            .flexible(true) // field count is checked per line for better errors
            .from_reader(reader);

        Self {
            reader,
            buffer: csv::StringRecord::new(),
            emitted: 0,
        }
    }
}

impl CsvRecordSource<File> {
    /// Opens the file at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Read`] when the file cannot be opened.
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)
            .map_err(|e| SourceError::Read(format!("cannot open '{}': {e}", path.display())))?;
        Ok(Self::from_reader(file))
    }
}

/// Converts one raw line into an [`IncomeRecord`].
///
/// `line` is the 1-based line number used in error messages.
fn parse_record(
    record: &csv::StringRecord,
    sequence: u64,
    line: u64,
) -> Result<IncomeRecord, SourceError> {
    let parse_error = |reason: String| SourceError::Parse { line, reason };

    if record.len() != 2 {
        return Err(parse_error(format!(
            "expected 2 fields (employee_id,gross_income), found {}",
            record.len()
        )));
    }

    let employee_id = &record[0];
    if employee_id.is_empty() {
        return Err(parse_error("employee id is empty".to_string()));
    }

    let raw_income = &record[1];
    let gross_income = raw_income
        .parse::<i64>()
        .map_err(|_| parse_error(format!("gross income '{raw_income}' is not an integer")))?;

    Ok(IncomeRecord::new(sequence, employee_id, gross_income))
}

#[async_trait]
impl<R: Read + Send> RecordSource for CsvRecordSource<R> {
    async fn next_record(&mut self) -> Result<Option<IncomeRecord>, SourceError> {
        let found = self
            .reader
            .read_record(&mut self.buffer)
            .map_err(|e| SourceError::Read(e.to_string()))?;
        if !found {
            return Ok(None);
        }

        let line = self.buffer.position().map_or(0, |p| p.line());
        let record = parse_record(&self.buffer, self.emitted, line)?;
        self.emitted += 1;
        Ok(Some(record))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    async fn read_all(input: &str) -> Result<Vec<IncomeRecord>, SourceError> {
        let mut source = CsvRecordSource::from_reader(input.as_bytes());
        let mut records = Vec::new();
        while let Some(record) = source.next_record().await? {
            records.push(record);
        }
        Ok(records)
    }

    #[tokio::test]
    async fn reads_records_in_file_order() {
        let records = read_all("101,10000\n102,2000\n103,50000\n").await.unwrap();

        assert_eq!(
            records,
            vec![
                IncomeRecord::new(0, "101", 10000),
                IncomeRecord::new(1, "102", 2000),
                IncomeRecord::new(2, "103", 50000),
            ]
        );
    }

    #[tokio::test]
    async fn tolerates_whitespace_crlf_and_blank_lines() {
        let records = read_all(" 101 , 10000 \r\n\r\n102,2000").await.unwrap();

        assert_eq!(
            records,
            vec![
                IncomeRecord::new(0, "101", 10000),
                IncomeRecord::new(1, "102", 2000),
            ]
        );
    }

    #[tokio::test]
    async fn empty_input_yields_nothing() {
        assert_eq!(read_all("").await.unwrap(), vec![]);
    }

    #[tokio::test]
    async fn negative_income_is_an_integer() {
        let records = read_all("101,-50\n").await.unwrap();

        assert_eq!(records[0].gross_income, -50);
    }

    #[tokio::test]
    async fn non_integer_income_is_fatal() {
        let result = read_all("101,10000\n102,12.5\n").await;

        assert_eq!(
            result,
            Err(SourceError::Parse {
                line: 2,
                reason: "gross income '12.5' is not an integer".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn currency_formatting_is_rejected() {
        let result = read_all("101,\"10,000\"\n").await;

        assert!(matches!(result, Err(SourceError::Parse { line: 1, .. })));
    }

    #[tokio::test]
    async fn missing_field_is_fatal() {
        let result = read_all("101\n").await;

        assert_eq!(
            result,
            Err(SourceError::Parse {
                line: 1,
                reason: "expected 2 fields (employee_id,gross_income), found 1".to_string(),
            })
        );
    }

    #[tokio::test]
    async fn extra_field_is_fatal() {
        let result = read_all("101,10000,extra\n").await;

        assert!(matches!(result, Err(SourceError::Parse { line: 1, .. })));
    }

    #[tokio::test]
    async fn empty_employee_id_is_fatal() {
        let result = read_all("101,1\n ,10000\n").await;

        assert_eq!(
            result,
            Err(SourceError::Parse {
                line: 2,
                reason: "employee id is empty".to_string(),
            })
        );
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let result = CsvRecordSource::from_path(Path::new("/definitely/not/here.csv"));

        assert!(matches!(result, Err(SourceError::Read(_))));
    }
}
