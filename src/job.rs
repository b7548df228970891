//! Crawl jobs and their queue message format
//!
//! A job message is a JSON object pushed onto the job queue by an external
//! producer:
//!
//! ```json
//! {"id": "j1", "starting_url": "http://a.test/", "max_depth": 1,
//!  "options": {"render_js": false}}
//! ```
//!
//! `max_depth` and `options` are optional. Unknown fields are ignored.

use crate::url::normalize_url;
use serde::Deserialize;
use thiserror::Error;
use url::Url;

/// Depth applied when a job message omits `max_depth`
pub const DEFAULT_MAX_DEPTH: u32 = 3;

/// Errors raised while turning a queue message into a [`Job`]
#[derive(Debug, Error)]
pub enum JobParseError {
    #[error("Malformed job message: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Job id cannot be empty")]
    EmptyId,

    #[error("Invalid starting_url {url:?}: {reason}")]
    InvalidStartingUrl { url: String, reason: String },
}

/// Per-job options recognised by the crawler
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct JobOptions {
    /// Fetch pages through the JavaScript rendering path
    #[serde(default)]
    pub render_js: bool,
}

/// One crawl request, read-only once dequeued
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    /// Opaque identifier chosen by the producer
    pub id: String,

    /// Starting URL exactly as submitted (trimmed); the same-origin prefix
    pub starting_url: String,

    /// Parsed form of `starting_url`, the first page fetched
    pub seed: Url,

    /// Maximum number of link hops from the seed
    pub max_depth: u32,

    /// Per-job options
    pub options: JobOptions,
}

/// Wire shape of a job message
#[derive(Debug, Deserialize)]
struct JobMessage {
    id: String,
    starting_url: String,
    #[serde(default)]
    max_depth: Option<u32>,
    #[serde(default)]
    options: Option<JobOptions>,
}

impl Job {
    /// Builds a job directly, validating the starting URL
    pub fn new(
        id: impl Into<String>,
        starting_url: &str,
        max_depth: u32,
        options: JobOptions,
    ) -> Result<Self, JobParseError> {
        let id = id.into();
        if id.trim().is_empty() {
            return Err(JobParseError::EmptyId);
        }

        let starting_url = starting_url.trim().to_string();
        let seed =
            normalize_url(&starting_url).map_err(|e| JobParseError::InvalidStartingUrl {
                url: starting_url.clone(),
                reason: e.to_string(),
            })?;

        Ok(Self {
            id,
            starting_url,
            seed,
            max_depth,
            options,
        })
    }

    /// Whether pages of this job are fetched through the rendering path
    pub fn render_js(&self) -> bool {
        self.options.render_js
    }
}

/// Parses a job queue message using [`DEFAULT_MAX_DEPTH`] when none is given
pub fn parse_job(message: &str) -> Result<Job, JobParseError> {
    parse_job_with_default_depth(message, DEFAULT_MAX_DEPTH)
}

/// Parses a job queue message, falling back to `default_depth`
///
/// # Errors
///
/// * [`JobParseError::Json`] - not JSON, missing `id`/`starting_url`, or a
///   field of the wrong type (including a negative `max_depth`)
/// * [`JobParseError::EmptyId`] - blank `id`
/// * [`JobParseError::InvalidStartingUrl`] - not an absolute http(s) URL
pub fn parse_job_with_default_depth(message: &str, default_depth: u32) -> Result<Job, JobParseError> {
    let raw: JobMessage = serde_json::from_str(message)?;

    Job::new(
        raw.id,
        &raw.starting_url,
        raw.max_depth.unwrap_or(default_depth),
        raw.options.unwrap_or_default(),
    )
}
