use crate::config::types::Config;
use crate::config::validation::validate;
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::path::Path;

/// Environment variables recognised as overrides, applied after the file is parsed
pub const ENV_REDIS_HOST: &str = "REDIS_HOST";
pub const ENV_REDIS_PORT: &str = "REDIS_PORT";
pub const ENV_REDIS_DB: &str = "REDIS_DB";
pub const ENV_JOB_QUEUE: &str = "CRAWLER_JOB_QUEUE";
pub const ENV_RESULT_QUEUE: &str = "CRAWLER_RESULT_QUEUE";
pub const ENV_RENDER_ENDPOINT: &str = "CRAWLER_RENDER_ENDPOINT";

/// Loads and parses a configuration file from the given path
///
/// Missing sections and keys fall back to their defaults. Environment overrides
/// are *not* applied here; see [`load_effective_config`].
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use crawl_worker::config::load_config;
///
/// let config = load_config(Path::new("worker.toml")).unwrap();
/// println!("Jobs key: {}", config.queue.jobs_key);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// # Returns
///
/// * `Ok(String)` - Hex-encoded SHA-256 hash of the file content
/// * `Err(ConfigError)` - Failed to read the file
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    let result = hasher.finalize();
    Ok(hex::encode(result))
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Builds the configuration the worker actually runs with
///
/// Starts from the file when one is given (defaults otherwise), applies the
/// process environment on top and validates the result.
///
/// # Returns
///
/// The effective configuration and, when a file was read, its hash
pub fn load_effective_config(path: Option<&Path>) -> Result<(Config, Option<String>), ConfigError> {
    let (mut config, hash) = match path {
        Some(path) => {
            let (config, hash) = load_config_with_hash(path)?;
            (config, Some(hash))
        }
        None => (Config::default(), None),
    };

    apply_env_overrides(&mut config, |var| std::env::var(var).ok())?;
    validate(&config)?;

    Ok((config, hash))
}

/// Applies environment-style overrides to a configuration
///
/// `lookup` returns the value of a variable, or `None` when it is unset. The
/// Redis endpoint variables apply to both the job queue and the result sink.
pub fn apply_env_overrides<F>(config: &mut Config, lookup: F) -> Result<(), ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    if let Some(host) = lookup(ENV_REDIS_HOST) {
        config.queue.host = host.clone();
        config.sink.host = host;
    }

    if let Some(port) = lookup(ENV_REDIS_PORT) {
        let port: u16 = port.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_REDIS_PORT.to_string(),
            message: format!("{} ({:?})", e, port),
        })?;
        config.queue.port = port;
        config.sink.port = port;
    }

    if let Some(db) = lookup(ENV_REDIS_DB) {
        let db: i64 = db.trim().parse().map_err(|e| ConfigError::Env {
            var: ENV_REDIS_DB.to_string(),
            message: format!("{} ({:?})", e, db),
        })?;
        config.queue.db = db;
        config.sink.db = db;
    }

    if let Some(key) = lookup(ENV_JOB_QUEUE) {
        config.queue.jobs_key = key;
    }

    if let Some(key) = lookup(ENV_RESULT_QUEUE) {
        config.sink.results_key = key;
    }

    if let Some(endpoint) = lookup(ENV_RENDER_ENDPOINT) {
        let endpoint = endpoint.trim().to_string();
        config.fetcher.render_endpoint = (!endpoint.is_empty()).then_some(endpoint);
    }

    Ok(())
}
