use crate::config::SinkConfig;
use crate::output::{PageResult, ResultSink, SinkResult};
use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

/// Result sink that RPUSHes JSON records onto a Redis list
#[derive(Clone)]
pub struct RedisResultSink {
    connection: MultiplexedConnection,
    key: String,
}

impl RedisResultSink {
    /// Connects to the sink endpoint described by `config`
    pub async fn connect(config: &SinkConfig) -> SinkResult<Self> {
        let client = redis::Client::open(config.redis_url())?;
        let connection = client.get_multiplexed_async_connection().await?;
        Ok(Self::with_connection(connection, config.results_key.clone()))
    }

    /// Wraps an established connection
    pub fn with_connection(connection: MultiplexedConnection, key: String) -> Self {
        Self { connection, key }
    }

    /// Name of the list results are appended to
    pub fn key(&self) -> &str {
        &self.key
    }
}

#[async_trait]
impl ResultSink for RedisResultSink {
    async fn write(&self, result: &PageResult) -> SinkResult<()> {
        let payload = result.to_json()?;
        let mut con = self.connection.clone();
        con.rpush::<_, _, ()>(&self.key, payload).await?;
        tracing::trace!(key = %self.key, url = %result.url, "Pushed result");
        Ok(())
    }
}
