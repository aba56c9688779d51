use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use netpay_core::PipelineConfig;
use netpay_core::pipeline::orchestrator::DEFAULT_QUEUE_CAPACITY;
use netpay_data::{BatchOptions, run_batch};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

// ─── CLI definition ──────────────────────────────────────────────────────────

/// Compute net-of-tax salaries for a batch of employees.
///
/// Reads `employee_id,gross_income` lines, withholds social insurance
/// according to the selected profile, applies the progressive income tax
/// schedule, and writes one result row per employee.
#[derive(Debug, Parser)]
#[command(name = "netpay")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Profile (city) to use from the config file; falls back to DEFAULT
    #[arg(short = 'C', long)]
    city: Option<String>,

    /// Path to the TOML insurance profile file
    #[arg(short = 'c', long)]
    config: PathBuf,

    /// Path to the employee income file
    #[arg(short = 'd', long)]
    userdata: PathBuf,

    /// Path of the result file to write
    #[arg(short = 'o', long)]
    output: PathBuf,

    /// Number of transform workers (defaults to available parallelism)
    #[arg(short = 'w', long)]
    workers: Option<usize>,

    /// Capacity of each internal queue
    #[arg(long, default_value_t = DEFAULT_QUEUE_CAPACITY)]
    queue_capacity: usize,

    /// Write results in input order instead of completion order
    #[arg(long, default_value_t = false)]
    ordered: bool,
}

// ─── tracing ─────────────────────────────────────────────────────────────────

/// Initialise the tracing subscriber.
///
/// * Honours `RUST_LOG` when set.
/// * Falls back to `info` so normal runs are quiet.
/// * Strips timestamps and target names to keep CLI output clean.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::from("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .without_time()
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

// ─── entry point ─────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    debug!(?cli, "parsed arguments");

    let mut pipeline = PipelineConfig {
        queue_capacity: cli.queue_capacity,
        preserve_order: cli.ordered,
        ..PipelineConfig::default()
    };
    if let Some(workers) = cli.workers {
        pipeline.workers = workers;
    }

    let options = BatchOptions {
        config_path: cli.config,
        city: cli.city,
        input_path: cli.userdata,
        output_path: cli.output,
        pipeline,
    };

    let summary = run_batch(&options).await.with_context(|| {
        format!(
            "Failed to compute net pay for {}",
            options.input_path.display()
        )
    })?;

    info!(
        "Processed {} records with {} workers into {}",
        summary.records_written,
        summary.workers,
        options.output_path.display()
    );

    Ok(())
}
