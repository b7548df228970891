//! State module for tracking crawl progress
//!
//! This module provides the per-job traversal state and the per-page outcome.
//!
//! # Components
//!
//! - `CrawlState`: frontier and visited set for one job's run
//! - `FrontierEntry`: a page waiting to be fetched, with its depth and parent
//! - `PageStatus`: the outcome recorded for each attempted page

mod crawl_state;
mod page_status;

// Re-export main types
pub use crawl_state::{CrawlState, FrontierEntry};
pub use page_status::PageStatus;
