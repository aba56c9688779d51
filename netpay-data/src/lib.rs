pub mod batch;
pub mod csv_sink;
pub mod csv_source;
pub mod profile;

pub use batch::{BatchError, BatchOptions, run_batch};
pub use csv_sink::{CsvResultSink, FileResultSink};
pub use csv_source::CsvRecordSource;
pub use profile::{Profile, ProfileError, ProfileSet};
