//! Result sink trait and error types

use crate::output::PageResult;
use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while writing results
#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Failed to serialize result: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to write result: {0}")]
    Write(String),
}

/// Result type for sink operations
pub type SinkResult<T> = Result<T, SinkError>;

/// Append-only destination for page results
///
/// Results are written one at a time, as soon as each page is done, so
/// consumers can observe partial progress of long crawls.
#[async_trait]
pub trait ResultSink: Send + Sync {
    /// Appends one result
    async fn write(&self, result: &PageResult) -> SinkResult<()>;
}
