//! Skimmer: a bounded-concurrency listing harvester
//!
//! This crate implements a two-tier scraping pipeline: a pool of page workers
//! fetches listing pages and extracts item links, a pool of item workers
//! fetches each item page and extracts a structured record, and a single
//! drain task streams records to a sink. All queues are bounded, so a slow
//! sink throttles the whole pipeline instead of buffering without limit.

pub mod config;
pub mod extract;
pub mod fetch;
pub mod pipeline;
pub mod seed;
pub mod sink;

use thiserror::Error;

/// Main error type for Skimmer operations
#[derive(Debug, Error)]
pub enum SkimmerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("Sink error: {0}")]
    Sink(#[from] sink::SinkError),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid URL in config: {0}")]
    InvalidUrl(String),

    #[error("Invalid CSS selector: {0}")]
    InvalidSelector(String),
}

/// Result type alias for Skimmer operations
pub type Result<T> = std::result::Result<T, SkimmerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

// Re-export commonly used types
pub use config::Config;
pub use extract::{ExtractRules, Record};
pub use fetch::{FetchError, Fetcher, HttpFetcher};
pub use pipeline::{run_pipeline, Summary};
pub use seed::SeedSource;
pub use sink::{CsvSink, RecordSink};
