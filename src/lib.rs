//! Crawl-Worker: a job-driven web crawler
//!
//! Workers pull crawl jobs from a durable queue, walk each job's site breadth-first
//! up to its depth bound while staying on the job's origin, and push one result
//! record per visited page to a result sink.

pub mod config;
pub mod crawler;
pub mod job;
pub mod output;
pub mod queue;
pub mod state;
pub mod url;
pub mod worker;

use thiserror::Error;

/// Errors raised while building the worker's HTTP side
#[derive(Debug, Error)]
pub enum WorkerError {
    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),
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

    #[error("Invalid value for environment variable {var}: {message}")]
    Env { var: String, message: String },
}

/// URL-specific errors
#[derive(Debug, Error)]
pub enum UrlError {
    #[error("Failed to parse URL: {0}")]
    Parse(String),

    #[error("Invalid URL scheme: {0}")]
    InvalidScheme(String),

    #[error("Missing domain in URL")]
    MissingDomain,
}

/// Result type alias for crawl-worker operations
pub type Result<T> = std::result::Result<T, WorkerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for URL operations
pub type UrlResult<T> = std::result::Result<T, UrlError>;

// Re-export commonly used types
pub use config::Config;
pub use crawler::{CrawlEngine, PageFetcher};
pub use job::{Job, JobOptions};
pub use output::{PageResult, ResultSink};
pub use queue::JobSource;
pub use state::{CrawlState, PageStatus};
pub use worker::JobQueueConsumer;
