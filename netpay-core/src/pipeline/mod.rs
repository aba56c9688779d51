//! Source → transform workers → sink pipeline.
//!
//! Records flow through two bounded queues. Each queue closes when its last
//! producer finishes, which is the only termination signal.

pub mod orchestrator;
pub mod sink;
pub mod source;

pub use orchestrator::{Pipeline, PipelineConfig, PipelineError, PipelineSummary};
pub use sink::{ResultSink, SinkError};
pub use source::{RecordSource, SourceError};
