//! Wires a [`RecordSource`], N [`TaxEngine`] workers, and a [`ResultSink`]
//! together through two bounded queues.
//!
//! # Termination
//!
//! | Queue          | Producers        | Closes when                      |
//! |----------------|------------------|----------------------------------|
//! | income (A)     | source stage     | the source reports exhaustion    |
//! | results (B)    | every worker     | the last worker has exited       |
//!
//! Workers exit when queue A is closed and drained; the sink stage exits when
//! queue B is closed and drained. No stage ever infers completion from a
//! quiet period.
//!
//! # Failure
//!
//! The first stage to fail cancels the others. The sink is then asked to
//! [`discard`](ResultSink::discard) its partial output and the original
//! error is returned. On success the sink is
//! [`finish`](ResultSink::finish)ed.

use std::collections::BTreeMap;
use std::num::NonZeroUsize;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::calculations::TaxEngine;
use crate::pipeline::sink::{ResultSink, SinkError};
use crate::pipeline::source::{RecordSource, SourceError};
use crate::{IncomeRecord, ResultRecord};

/// Default capacity of each queue.
pub const DEFAULT_QUEUE_CAPACITY: usize = 256;

/// Errors that abort a pipeline run.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum PipelineError {
    /// Worker count or queue capacity was zero.
    #[error("invalid pipeline configuration: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Source(#[from] SourceError),

    #[error(transparent)]
    Sink(#[from] SinkError),

    /// A transform worker panicked or lost its queues.
    #[error("transform worker failed: {0}")]
    Worker(String),
}

/// Tuning for a pipeline run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of concurrent transform workers.
    pub workers: usize,
    /// Capacity of the income and result queues.
    pub queue_capacity: usize,
    /// Re-sequence results into input order before they reach the sink.
    pub preserve_order: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            workers: std::thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            preserve_order: false,
        }
    }
}

/// Counts reported by a successful run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineSummary {
    pub records_read: u64,
    pub records_processed: u64,
    pub records_written: u64,
    pub workers: usize,
}

/// A configured source → workers → sink pipeline.
#[derive(Debug, Clone)]
pub struct Pipeline {
    engine: Arc<TaxEngine>,
    config: PipelineConfig,
}

impl Pipeline {
    /// Creates a pipeline around `engine`.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidConfig`] if `workers` or
    /// `queue_capacity` is zero.
    pub fn new(
        engine: TaxEngine,
        config: PipelineConfig,
    ) -> Result<Self, PipelineError> {
        if config.workers == 0 {
            return Err(PipelineError::InvalidConfig(
                "at least one worker is required".to_string(),
            ));
        }
        if config.queue_capacity == 0 {
            return Err(PipelineError::InvalidConfig(
                "queue capacity must be positive".to_string(),
            ));
        }

        Ok(Self {
            engine: Arc::new(engine),
            config,
        })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Runs every record from `source` through the engine into `sink`.
    ///
    /// # Errors
    ///
    /// Returns the first [`PipelineError`] raised by any stage. The sink has
    /// already been asked to discard its output when this happens.
    pub async fn run<S, K>(
        &self,
        source: &mut S,
        sink: &mut K,
    ) -> Result<PipelineSummary, PipelineError>
    where
        S: RecordSource + ?Sized,
        K: ResultSink + ?Sized,
    {
        info!(
            workers = self.config.workers,
            queue_capacity = self.config.queue_capacity,
            preserve_order = self.config.preserve_order,
            "starting pipeline"
        );

        let (income_tx, income_rx) = mpsc::channel::<IncomeRecord>(self.config.queue_capacity);
        let (result_tx, result_rx) = mpsc::channel::<ResultRecord>(self.config.queue_capacity);
        let income_rx = Arc::new(Mutex::new(income_rx));

        let mut workers = JoinSet::new();
        for worker in 0..self.config.workers {
            workers.spawn(run_worker(
                worker,
                Arc::clone(&self.engine),
                Arc::clone(&income_rx),
                result_tx.clone(),
            ));
        }
        // Only workers may hold result senders, or queue B never closes.
        drop(result_tx);

        let outcome = tokio::try_join!(
            produce(source, income_tx),
            join_workers(workers),
            consume(sink, result_rx, self.config.preserve_order),
        );
        // Output is complete only once the sink has flushed.
        let outcome = match outcome {
            Ok(counts) => sink.finish().await.map(|()| counts).map_err(PipelineError::from),
            Err(err) => Err(err),
        };

        match outcome {
            Ok((records_read, records_processed, records_written)) => {
                let summary = PipelineSummary {
                    records_read,
                    records_processed,
                    records_written,
                    workers: self.config.workers,
                };
                info!(
                    read = records_read,
                    written = records_written,
                    "pipeline finished"
                );
                Ok(summary)
            }
            Err(err) => {
                warn!(error = %err, "pipeline aborted; discarding partial output");
                if let Err(discard_err) = sink.discard().await {
                    error!(error = %discard_err, "failed to discard partial output");
                }
                Err(err)
            }
        }
    }
}

/// Source stage: pulls records and feeds queue A, stamping each with its
/// emission index. Dropping `queue` on return closes queue A.
async fn produce<S>(
    source: &mut S,
    queue: mpsc::Sender<IncomeRecord>,
) -> Result<u64, PipelineError>
where
    S: RecordSource + ?Sized,
{
    let mut sequence = 0;
    while let Some(mut record) = source.next_record().await? {
        record.sequence = sequence;
        queue
            .send(record)
            .await
            .map_err(|_| PipelineError::Worker("income queue closed early".to_string()))?;
        sequence += 1;
    }

    info!(records = sequence, "source exhausted");
    Ok(sequence)
}

/// Transform stage: one worker. Exits when queue A is closed and empty.
async fn run_worker(
    worker: usize,
    engine: Arc<TaxEngine>,
    queue: Arc<Mutex<mpsc::Receiver<IncomeRecord>>>,
    results: mpsc::Sender<ResultRecord>,
) -> Result<u64, PipelineError> {
    let mut processed = 0;
    loop {
        let next = queue.lock().await.recv().await;
        let Some(record) = next else {
            break;
        };

        let result = engine.process(&record);
        debug!(
            worker,
            employee_id = %result.employee_id,
            net_pay = %result.net_pay,
            "record processed"
        );

        results
            .send(result)
            .await
            .map_err(|_| PipelineError::Worker(format!("worker {worker}: result queue closed")))?;
        processed += 1;
    }

    debug!(worker, processed, "worker finished");
    Ok(processed)
}

/// Waits for every worker. Dropping the set on early return aborts the rest.
async fn join_workers(
    mut workers: JoinSet<Result<u64, PipelineError>>
) -> Result<u64, PipelineError> {
    let mut processed = 0;
    while let Some(joined) = workers.join_next().await {
        processed += joined.map_err(|e| PipelineError::Worker(e.to_string()))??;
    }
    Ok(processed)
}

/// Sink stage: drains queue B until every worker has dropped its sender.
async fn consume<K>(
    sink: &mut K,
    mut results: mpsc::Receiver<ResultRecord>,
    preserve_order: bool,
) -> Result<u64, PipelineError>
where
    K: ResultSink + ?Sized,
{
    let mut written = 0;

    if !preserve_order {
        while let Some(record) = results.recv().await {
            sink.write(&record).await?;
            written += 1;
        }
        return Ok(written);
    }

    let mut pending = BTreeMap::new();
    let mut next_sequence = 0;
    while let Some(record) = results.recv().await {
        pending.insert(record.sequence, record);
        while let Some(record) = pending.remove(&next_sequence) {
            sink.write(&record).await?;
            written += 1;
            next_sequence += 1;
        }
    }

    // Sequences are contiguous, so this only drains on a logic error.
    for record in pending.into_values() {
        warn!(sequence = record.sequence, "writing result out of sequence");
        sink.write(&record).await?;
        written += 1;
    }

    Ok(written)
}
