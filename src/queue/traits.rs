//! Job source trait and error types

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur while waiting for jobs
#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Failed to read job message: {0}")]
    Read(String),
}

/// Result type for queue operations
pub type QueueResult<T> = Result<T, QueueError>;

/// Durable queue of raw job messages
///
/// A message is handed out at most once; there is no acknowledgment, so a
/// worker that dies mid-job loses that job.
#[async_trait]
pub trait JobSource: Send {
    /// Waits, without a deadline, for the next job message
    ///
    /// # Returns
    ///
    /// * `Ok(Some(message))` - the next raw message
    /// * `Ok(None)` - the source is closed and will never yield again
    /// * `Err(QueueError)` - transport failure; the caller may retry
    async fn next_message(&mut self) -> QueueResult<Option<String>>;
}
