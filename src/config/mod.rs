//! Configuration module for the crawl worker
//!
//! This module handles loading, parsing, and validating TOML configuration files,
//! layered with environment overrides for the transport endpoints.
//!
//! # Example
//!
//! ```no_run
//! use crawl_worker::config::load_effective_config;
//! use std::path::Path;
//!
//! let (config, _hash) = load_effective_config(Some(Path::new("worker.toml"))).unwrap();
//! println!("Popping jobs from: {}", config.queue.jobs_key);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, FetcherConfig, OriginPolicy, QueueConfig, SinkConfig,
};

// Re-export parser functions
pub use parser::{
    apply_env_overrides, compute_config_hash, load_config, load_config_with_hash,
    load_effective_config,
};
pub use validation::validate;
