//! Record sinks
//!
//! A sink is the final consumer of harvested records. Exactly one task (the
//! pipeline's drain) ever touches the sink, so implementations need no
//! internal synchronization. A failed write is reported in the run summary
//! but does not stop the drain; the record counts as processed either way.

mod csv;

pub use csv::CsvSink;

use crate::extract::Record;
use thiserror::Error;

/// Errors that can occur while writing records
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to open sink target: {0}")]
    Open(String),

    #[error("Failed to write record: {0}")]
    Write(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// An append-only destination for records
pub trait RecordSink {
    /// Appends one record
    fn write(&mut self, record: &Record) -> SinkResult<()>;

    /// Flushes any buffered output; called once after the last record
    fn flush(&mut self) -> SinkResult<()>;
}
