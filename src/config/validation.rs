use crate::config::types::{Config, CrawlerConfig, FetcherConfig, QueueConfig, SinkConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_queue_config(&config.queue)?;
    validate_sink_config(&config.sink)?;
    validate_fetcher_config(&config.fetcher)?;
    validate_crawler_config(&config.crawler)?;
    Ok(())
}

/// Validates the job queue endpoint
fn validate_queue_config(config: &QueueConfig) -> Result<(), ConfigError> {
    validate_endpoint("queue", &config.host, config.port, config.db)?;

    if config.jobs_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "queue.jobs-key cannot be empty".to_string(),
        ));
    }

    if config.poll_timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "queue.poll-timeout-secs must be >= 1".to_string(),
        ));
    }

    Ok(())
}

/// Validates the result sink endpoint
fn validate_sink_config(config: &SinkConfig) -> Result<(), ConfigError> {
    validate_endpoint("sink", &config.host, config.port, config.db)?;

    if config.results_key.trim().is_empty() {
        return Err(ConfigError::Validation(
            "sink.results-key cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Shared host/port/db checks for Redis endpoints
fn validate_endpoint(section: &str, host: &str, port: u16, db: i64) -> Result<(), ConfigError> {
    if host.trim().is_empty() {
        return Err(ConfigError::Validation(format!(
            "{}.host cannot be empty",
            section
        )));
    }

    if port == 0 {
        return Err(ConfigError::Validation(format!(
            "{}.port must be between 1 and 65535, got 0",
            section
        )));
    }

    if db < 0 {
        return Err(ConfigError::Validation(format!(
            "{}.db must be >= 0, got {}",
            section, db
        )));
    }

    Ok(())
}

/// Validates HTTP fetcher settings
fn validate_fetcher_config(config: &FetcherConfig) -> Result<(), ConfigError> {
    if config.user_agent.trim().is_empty() {
        return Err(ConfigError::Validation(
            "fetcher.user-agent cannot be empty".to_string(),
        ));
    }

    if config.timeout_secs == 0 {
        return Err(ConfigError::Validation(
            "fetcher.timeout-secs must be >= 1".to_string(),
        ));
    }

    if config.connect_timeout_secs == 0 || config.connect_timeout_secs > config.timeout_secs {
        return Err(ConfigError::Validation(format!(
            "fetcher.connect-timeout-secs must be between 1 and timeout-secs ({}), got {}",
            config.timeout_secs, config.connect_timeout_secs
        )));
    }

    if let Some(endpoint) = &config.render_endpoint {
        let url = Url::parse(endpoint).map_err(|e| {
            ConfigError::InvalidUrl(format!("Invalid render-endpoint '{}': {}", endpoint, e))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl(format!(
                "render-endpoint '{}' must use http or https",
                endpoint
            )));
        }
    }

    Ok(())
}

/// Validates crawl behaviour settings
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_pages_per_job == Some(0) {
        return Err(ConfigError::Validation(
            "crawler.max-pages-per-job must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}
