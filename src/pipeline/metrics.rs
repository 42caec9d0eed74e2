//! Shared pipeline counters and the end-of-run summary
//!
//! Workers on every tier share one [`PipelineMetrics`] instance through an
//! `Arc`. All updates are atomic increments; there is no lock to contend
//! on and no counter is ever raced.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Concurrency-safe counters shared by all pipeline workers
#[derive(Debug, Default)]
pub struct PipelineMetrics {
    fetch_failures: AtomicU64,
    records_written: AtomicU64,
    sink_write_failures: AtomicU64,
}

impl PipelineMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one failed fetch (or otherwise failed stage application)
    pub fn record_fetch_failure(&self) {
        self.fetch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one record successfully written to the sink
    pub fn record_written(&self) {
        self.records_written.fetch_add(1, Ordering::Relaxed);
    }

    /// Records one failed sink write
    pub fn record_sink_failure(&self) {
        self.sink_write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn fetch_failures(&self) -> u64 {
        self.fetch_failures.load(Ordering::Relaxed)
    }

    pub fn records_written(&self) -> u64 {
        self.records_written.load(Ordering::Relaxed)
    }

    pub fn sink_write_failures(&self) -> u64 {
        self.sink_write_failures.load(Ordering::Relaxed)
    }

    /// Snapshots the counters into a [`Summary`]
    pub fn summary(&self, elapsed: Duration) -> Summary {
        Summary {
            records_written: self.records_written(),
            fetch_failures: self.fetch_failures(),
            sink_write_failures: self.sink_write_failures(),
            elapsed,
        }
    }
}

/// Observable outcome of a pipeline run
#[derive(Debug, Clone)]
pub struct Summary {
    /// Records successfully written to the sink
    pub records_written: u64,

    /// Fetches (page or item tier) that failed and were dropped
    pub fetch_failures: u64,

    /// Sink writes that failed; the records count as processed anyway
    pub sink_write_failures: u64,

    /// Wall-clock duration of the run
    pub elapsed: Duration,
}
