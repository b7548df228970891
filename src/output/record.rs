//! Page results and their wire format
//!
//! One [`PageResult`] is produced per attempted page. On the result queue it is
//! written as:
//!
//! ```json
//! {"job_id": "j1", "url": "http://a.test/",
//!  "data": {"title": "...", "meta": {"description": "...", "canonical": "..."},
//!           "content": {"h1": "...", "keywords": []},
//!           "schema_suggestions": [], "metrics": {"load_time": 0.12},
//!           "depth": 0, "parent_url": null, "internal_links_count": 4,
//!           "request_analysis": {"status": 200}},
//!  "status": "completed"}
//! ```
//!
//! Failed pages carry an additional top-level `"error"` string.

use crate::crawler::{FetchError, FetchedPage, PageMetadata};
use crate::state::{FrontierEntry, PageStatus};
use serde::Serialize;

/// Outcome of one page attempt within a job
#[derive(Debug, Clone, PartialEq)]
pub struct PageResult {
    /// Job the page belongs to
    pub job_id: String,

    /// Final (post-redirect) URL, or the requested URL when the fetch failed
    pub url: String,

    /// Link hops from the job's seed
    pub depth: u32,

    /// Page the URL was discovered on
    pub parent_url: Option<String>,

    /// Completed or failed
    pub status: PageStatus,

    /// Extracted metadata (empty for failed pages)
    pub metadata: PageMetadata,

    /// HTTP status of the final response, when one was received
    pub http_status: Option<u16>,

    /// Fetch latency in milliseconds
    pub latency_ms: u64,

    /// Same-origin links found on the page; `None` when links were not extracted
    pub internal_links_count: Option<usize>,

    /// Failure description for failed pages
    pub error: Option<String>,
}

impl PageResult {
    /// Builds the result of a successful fetch
    pub fn completed(
        job_id: &str,
        entry: &FrontierEntry,
        page: &FetchedPage,
        metadata: PageMetadata,
        internal_links_count: Option<usize>,
    ) -> Self {
        Self {
            job_id: job_id.to_string(),
            url: page.final_url.to_string(),
            depth: entry.depth,
            parent_url: entry.parent.as_ref().map(ToString::to_string),
            status: PageStatus::Completed,
            metadata,
            http_status: Some(page.status),
            latency_ms: page.latency_ms,
            internal_links_count,
            error: None,
        }
    }

    /// Builds the result of a failed fetch
    pub fn failed(job_id: &str, entry: &FrontierEntry, error: &FetchError) -> Self {
        Self {
            job_id: job_id.to_string(),
            url: entry.url.to_string(),
            depth: entry.depth,
            parent_url: entry.parent.as_ref().map(ToString::to_string),
            status: PageStatus::Failed,
            metadata: PageMetadata::default(),
            http_status: error.status(),
            latency_ms: 0,
            internal_links_count: None,
            error: Some(error.to_string()),
        }
    }

    /// Borrowed view in the result-queue shape
    pub fn to_record(&self) -> ResultRecord<'_> {
        ResultRecord {
            job_id: &self.job_id,
            url: &self.url,
            data: RecordData {
                title: self.metadata.title.as_deref(),
                meta: RecordMeta {
                    description: self.metadata.description.as_deref(),
                    canonical: self.metadata.canonical.as_deref(),
                },
                content: RecordContent {
                    h1: self.metadata.h1.as_deref(),
                    keywords: Vec::new(),
                },
                schema_suggestions: Vec::new(),
                metrics: RecordMetrics {
                    load_time: self.latency_ms as f64 / 1000.0,
                },
                depth: self.depth,
                parent_url: self.parent_url.as_deref(),
                internal_links_count: self.internal_links_count,
                request_analysis: RequestAnalysis {
                    status: self.http_status,
                },
            },
            status: self.status,
            error: self.error.as_deref(),
        }
    }

    /// Serializes the result as a result-queue JSON message
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.to_record())
    }
}

/// Result-queue message
#[derive(Debug, Serialize)]
pub struct ResultRecord<'a> {
    pub job_id: &'a str,
    pub url: &'a str,
    pub data: RecordData<'a>,
    pub status: PageStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RecordData<'a> {
    pub title: Option<&'a str>,
    pub meta: RecordMeta<'a>,
    pub content: RecordContent<'a>,
    /// Reserved for semantic schema inference; always empty
    pub schema_suggestions: Vec<String>,
    pub metrics: RecordMetrics,
    pub depth: u32,
    pub parent_url: Option<&'a str>,
    pub internal_links_count: Option<usize>,
    pub request_analysis: RequestAnalysis,
}

#[derive(Debug, Serialize)]
pub struct RecordMeta<'a> {
    pub description: Option<&'a str>,
    pub canonical: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub struct RecordContent<'a> {
    pub h1: Option<&'a str>,
    /// Reserved for keyword extraction; always empty
    pub keywords: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RecordMetrics {
    /// Seconds
    pub load_time: f64,
}

#[derive(Debug, Serialize)]
pub struct RequestAnalysis {
    pub status: Option<u16>,
}
