//! Output module for per-page crawl results
//!
//! This module handles:
//! - Shaping page results into result-queue records
//! - The result sink abstraction
//! - The Redis list sink used in production

mod record;
mod redis_sink;
mod traits;

pub use record::{PageResult, ResultRecord};
pub use redis_sink::RedisResultSink;
pub use traits::{ResultSink, SinkError, SinkResult};
