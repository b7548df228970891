//! Worker module
//!
//! The long-running consumer that ties the job queue, the crawl engine and
//! the result sink together.

mod consumer;

pub use consumer::{JobOutcome, JobQueueConsumer, JobRunError, JobSummary, DEFAULT_ERROR_BACKOFF};
