//! Job queue consumer
//!
//! Pulls one job at a time from a [`JobSource`], runs a [`CrawlEngine`] for it
//! and streams every page result to a [`ResultSink`]. Failures are contained
//! at the job boundary: a bad message, a sink outage or a panic inside the
//! crawl abandons that job only.

use crate::config::CrawlerConfig;
use crate::crawler::{CrawlEngine, EngineSettings, PageFetcher};
use crate::job::{parse_job_with_default_depth, Job, JobParseError};
use crate::output::{ResultSink, SinkError};
use crate::queue::{JobSource, QueueResult};
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::time::{Duration, Instant};
use thiserror::Error;

/// Pause after a failed dequeue before asking the queue again
pub const DEFAULT_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// Failure that abandoned a job part-way
#[derive(Debug, Error)]
pub enum JobRunError {
    #[error("Failed to write result: {0}")]
    Sink(#[from] SinkError),

    #[error("Crawl panicked: {0}")]
    Panicked(String),
}

/// Counters for a job that ran to completion
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JobSummary {
    pub job_id: String,
    pub pages_completed: u32,
    pub pages_failed: u32,
    pub elapsed: Duration,
}

impl JobSummary {
    /// Total number of results written for the job
    pub fn pages_total(&self) -> u32 {
        self.pages_completed + self.pages_failed
    }
}

/// What happened to one dequeued message
#[derive(Debug)]
pub enum JobOutcome {
    /// The job's traversal finished and every result was written
    Completed(JobSummary),

    /// The message could not be parsed into a job and was dropped
    Malformed(JobParseError),

    /// The job was abandoned part-way
    Failed { job_id: String, error: JobRunError },
}

/// Consumes crawl jobs forever
///
/// The consumer owns its transport handles; nothing is shared between
/// consumers, so several can run side by side against the same queue.
pub struct JobQueueConsumer<Q, S, F>
where
    Q: JobSource,
    S: ResultSink,
    F: PageFetcher,
{
    queue: Q,
    sink: S,
    fetcher: F,
    crawler: CrawlerConfig,
    error_backoff: Duration,
}

impl<Q, S, F> JobQueueConsumer<Q, S, F>
where
    Q: JobSource,
    S: ResultSink,
    F: PageFetcher,
{
    /// Creates a consumer from its queue, sink and fetcher
    pub fn new(queue: Q, sink: S, fetcher: F, crawler: CrawlerConfig) -> Self {
        Self {
            queue,
            sink,
            fetcher,
            crawler,
            error_backoff: DEFAULT_ERROR_BACKOFF,
        }
    }

    /// Overrides the pause after a failed dequeue
    pub fn with_error_backoff(mut self, backoff: Duration) -> Self {
        self.error_backoff = backoff;
        self
    }

    /// Processes jobs until the job source closes
    ///
    /// The Redis source never closes, so in production this only ends when
    /// the surrounding task is cancelled.
    pub async fn run_forever(&mut self) {
        tracing::info!("Waiting for jobs");

        loop {
            match self.process_next().await {
                Ok(Some(_)) => {}
                Ok(None) => {
                    tracing::info!("Job source closed, consumer stopping");
                    return;
                }
                Err(e) => {
                    tracing::error!(
                        "Failed to read from job queue: {} (retrying in {:?})",
                        e,
                        self.error_backoff
                    );
                    tokio::time::sleep(self.error_backoff).await;
                }
            }
        }
    }

    /// Waits for one message and handles it
    ///
    /// # Returns
    ///
    /// * `Ok(Some(outcome))` - a message was consumed
    /// * `Ok(None)` - the job source is closed
    /// * `Err(QueueError)` - the dequeue itself failed
    pub async fn process_next(&mut self) -> QueueResult<Option<JobOutcome>> {
        let message = match self.queue.next_message().await? {
            Some(message) => message,
            None => return Ok(None),
        };

        let job = match parse_job_with_default_depth(&message, self.crawler.default_max_depth) {
            Ok(job) => job,
            Err(e) => {
                tracing::warn!("Dropping malformed job message: {}", e);
                tracing::debug!(message = %message, "Malformed message body");
                return Ok(Some(JobOutcome::Malformed(e)));
            }
        };

        let job_id = job.id.clone();
        let outcome = match self.run_job(job).await {
            Ok(summary) => {
                tracing::info!(
                    job_id = %summary.job_id,
                    completed = summary.pages_completed,
                    failed = summary.pages_failed,
                    elapsed_ms = summary.elapsed.as_millis() as u64,
                    "Job finished"
                );
                JobOutcome::Completed(summary)
            }
            Err(error) => {
                tracing::error!(job_id = %job_id, "Job abandoned: {}", error);
                JobOutcome::Failed { job_id, error }
            }
        };

        Ok(Some(outcome))
    }

    /// Crawls one job to completion, writing each result as it is produced
    pub async fn run_job(&self, job: Job) -> Result<JobSummary, JobRunError> {
        AssertUnwindSafe(self.crawl(job))
            .catch_unwind()
            .await
            .unwrap_or_else(|payload| Err(JobRunError::Panicked(panic_message(payload))))
    }

    async fn crawl(&self, job: Job) -> Result<JobSummary, JobRunError> {
        let started = Instant::now();
        let job_id = job.id.clone();

        tracing::info!(
            job_id = %job_id,
            url = %job.seed,
            max_depth = job.max_depth,
            render_js = job.render_js(),
            "Starting job"
        );

        let mut engine = CrawlEngine::new(job, &self.fetcher, EngineSettings::from(&self.crawler));
        while let Some(result) = engine.next_result().await {
            self.sink.write(&result).await?;
        }

        let stats = engine.stats();
        Ok(JobSummary {
            job_id,
            pages_completed: stats.completed,
            pages_failed: stats.failed,
            elapsed: started.elapsed(),
        })
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
