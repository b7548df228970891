use crate::config::QueueConfig;
use crate::queue::{JobSource, QueueResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

/// Job source that BLPOPs messages from a Redis list
///
/// Producers RPUSH onto the same list, so jobs are served in FIFO order. Each
/// BLPOP is bounded by the configured poll timeout and reissued when it
/// expires, which keeps a dead connection from hanging the worker silently.
pub struct RedisJobQueue {
    connection: MultiplexedConnection,
    key: String,
    poll_timeout_secs: f64,
}

impl RedisJobQueue {
    /// Connects to the queue endpoint described by `config`
    pub async fn connect(config: &QueueConfig) -> QueueResult<Self> {
        let client = redis::Client::open(config.redis_url())?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self::with_connection(
            connection,
            config.jobs_key.clone(),
            config.poll_timeout_secs,
        ))
    }

    /// Wraps an established connection
    pub fn with_connection(
        connection: MultiplexedConnection,
        key: String,
        poll_timeout_secs: u64,
    ) -> Self {
        Self {
            connection,
            key,
            poll_timeout_secs: poll_timeout_secs as f64,
        }
    }

    /// Name of the list jobs are popped from
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl JobSource for RedisJobQueue {
    async fn next_message(&mut self) -> QueueResult<Option<String>> {
        loop {
            let popped: Option<(String, String)> = self
                .connection
                .blpop(&self.key, self.poll_timeout_secs)
                .await?;

            match popped {
                Some((_, message)) => return Ok(Some(message)),
                None => tracing::trace!(key = %self.key, "Job queue idle"),
            }
        }
    }
}
