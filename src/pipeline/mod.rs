//! The two-tier scraping pipeline
//!
//! This module contains the core of the crate:
//! - a generic bounded worker pool ([`pool::StagePool`])
//! - the pipeline wiring and staged shutdown ([`runner::run_pipeline`])
//! - shared counters and the run summary ([`metrics`])

mod metrics;
mod pool;
mod runner;

pub use metrics::{PipelineMetrics, Summary};
pub use pool::StagePool;
pub use runner::run_pipeline;

use crate::config::Config;
use crate::extract::ExtractRules;
use crate::fetch::{build_http_client, HttpFetcher};
use crate::seed::SeedSource;
use crate::sink::CsvSink;
use crate::{ConfigError, SkimmerError};
use std::path::Path;
use std::sync::Arc;

/// Runs a complete harvest from a loaded configuration
///
/// Builds the HTTP client, extraction rules, seed source, and CSV sink,
/// then drives [`run_pipeline`] to completion. This is the entry point the
/// CLI uses.
pub async fn run(config: &Config) -> Result<Summary, SkimmerError> {
    let client = build_http_client(&config.user_agent)?;
    let fetcher = Arc::new(HttpFetcher::new(client));

    // Selectors were validated at config load; a failure here means the
    // config was constructed without going through validation.
    let rules = ExtractRules::try_from(&config.extract)
        .map_err(|e| SkimmerError::Config(ConfigError::InvalidSelector(e)))?;

    let seeds = SeedSource::from(&config.seeds);
    let sink = CsvSink::create(Path::new(&config.output.csv_path))?;

    Ok(run_pipeline(seeds, fetcher, rules, sink, &config.pipeline).await)
}
