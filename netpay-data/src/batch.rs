//! One complete batch run: resolve the profile, read the income file,
//! compute every record, and write the results file.

use std::path::PathBuf;

use netpay_core::pipeline::{SinkError, SourceError};
use netpay_core::{Pipeline, PipelineConfig, PipelineError, PipelineSummary, TaxEngine, TaxTable};
use thiserror::Error;
use tracing::info;

use crate::csv_sink::FileResultSink;
use crate::csv_source::CsvRecordSource;
use crate::profile::{ProfileError, ProfileSet};

/// Errors that end a batch run.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("configuration error: {0}")]
    Profile(#[from] ProfileError),

    #[error("cannot open input: {0}")]
    Input(#[from] SourceError),

    #[error("cannot open output: {0}")]
    Output(#[from] SinkError),

    #[error(transparent)]
    Pipeline(#[from] PipelineError),
}

/// Everything needed for one batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    pub config_path: PathBuf,
    /// Profile to select; `DEFAULT` when `None` or unknown.
    pub city: Option<String>,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub pipeline: PipelineConfig,
}

/// Runs one batch.
///
/// Configuration is fully resolved before the output file is created, so a
/// configuration error leaves no output behind. Any later failure removes
/// the partially written output file.
///
/// # Errors
///
/// Returns [`BatchError`] for invalid configuration, an unreadable input
/// file, an output file that cannot be created, or any pipeline failure
/// (including the first malformed input line).
pub async fn run_batch(options: &BatchOptions) -> Result<PipelineSummary, BatchError> {
    let profiles = ProfileSet::from_path(&options.config_path)?;
    let profile = profiles.resolve(options.city.as_deref())?;
    info!(profile = %profile.name, "using insurance profile");

    let engine = TaxEngine::new(profile.insurance, TaxTable::default())
        .with_income_tax_start_point(profile.income_tax_start_point);
    let pipeline = Pipeline::new(engine, options.pipeline)?;

    let mut source = CsvRecordSource::from_path(&options.input_path)?;
    let mut sink = FileResultSink::create(&options.output_path)?;

    let summary = pipeline.run(&mut source, &mut sink).await?;
    info!(
        records = summary.records_written,
        output = %options.output_path.display(),
        "results written"
    );
    Ok(summary)
}
