//! Crawler module for web page fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Page fetching, static or through a rendering service
//! - HTML parsing, metadata and link extraction
//! - The per-job crawl engine

mod engine;
mod fetcher;
mod parser;

pub use engine::{CrawlEngine, EngineSettings, EngineStats};
pub use fetcher::{build_http_client, FetchError, FetchedPage, HttpFetcher, PageFetcher};
pub use parser::{extract_links, extract_metadata, parse_html, PageMetadata, ParsedPage};
