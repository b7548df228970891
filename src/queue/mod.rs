//! Job queue module
//!
//! This module defines where jobs come from:
//! - The job source abstraction
//! - The Redis list source used in production

mod redis_queue;
mod traits;

pub use redis_queue::RedisJobQueue;
pub use traits::{JobSource, QueueError, QueueResult};
