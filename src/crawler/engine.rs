//! Crawl engine - bounded traversal of one job
//!
//! The engine owns a fresh [`CrawlState`] and turns a job into a finite,
//! lazily produced sequence of page results:
//! - Pages are fetched one at a time in breadth-first order
//! - Links are expanded only from pages below the job's depth bound
//! - Only links passing the same-origin test are followed
//! - No page is attempted twice

use crate::config::{CrawlerConfig, OriginPolicy};
use crate::crawler::parser::{extract_metadata, parse_html};
use crate::crawler::{FetchedPage, PageFetcher};
use crate::job::Job;
use crate::output::PageResult;
use crate::state::{CrawlState, FrontierEntry};
use crate::url::{is_same_origin, visit_key};
use futures::stream::{self, Stream};

/// Traversal knobs shared by every job a worker runs
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineSettings {
    /// Same-origin test for discovered links
    pub origin_policy: OriginPolicy,

    /// Stop after this many fetches (unbounded when `None`)
    pub max_pages: Option<u32>,
}

impl From<&CrawlerConfig> for EngineSettings {
    fn from(config: &CrawlerConfig) -> Self {
        Self {
            origin_policy: config.origin_policy,
            max_pages: config.max_pages_per_job,
        }
    }
}

/// Counters for one engine run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    /// Pages fetched and parsed
    pub completed: u32,

    /// Pages whose fetch failed
    pub failed: u32,

    /// Fetches that redirected to an already visited page and were dropped
    pub duplicates: u32,

    /// Pages still waiting when the stats were taken
    pub pending: usize,
}

/// Drives the traversal of a single job
///
/// An engine is single-use: it is created with a fresh state for its job and
/// is exhausted once [`CrawlEngine::next_result`] returns `None`.
///
/// # Example
///
/// ```no_run
/// use crawl_worker::config::FetcherConfig;
/// use crawl_worker::crawler::{CrawlEngine, EngineSettings, HttpFetcher};
/// use crawl_worker::job::parse_job;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let fetcher = HttpFetcher::new(&FetcherConfig::default())?;
/// let job = parse_job(r#"{"id":"j1","starting_url":"https://example.com/","max_depth":1}"#)?;
///
/// let mut engine = CrawlEngine::new(job, &fetcher, EngineSettings::default());
/// while let Some(result) = engine.next_result().await {
///     println!("{} {}", result.status, result.url);
/// }
/// # Ok(())
/// # }
/// ```
pub struct CrawlEngine<'a, F: PageFetcher + ?Sized> {
    job: Job,
    fetcher: &'a F,
    settings: EngineSettings,
    state: CrawlState,
    stats: EngineStats,
}

impl<'a, F: PageFetcher + ?Sized> CrawlEngine<'a, F> {
    /// Creates an engine for `job`, seeding the frontier with its starting URL
    pub fn new(job: Job, fetcher: &'a F, settings: EngineSettings) -> Self {
        let state = CrawlState::new(job.seed.clone(), job.max_depth);

        Self {
            job,
            fetcher,
            settings,
            state,
            stats: EngineStats::default(),
        }
    }

    /// The job being crawled
    pub fn job(&self) -> &Job {
        &self.job
    }

    /// Counters so far
    pub fn stats(&self) -> EngineStats {
        EngineStats {
            pending: self.state.frontier_size(),
            ..self.stats
        }
    }

    /// Attempts the next page and returns its result
    ///
    /// Returns `None` once the frontier is exhausted or the page cap is hit.
    pub async fn next_result(&mut self) -> Option<PageResult> {
        loop {
            if self.page_cap_reached() {
                return None;
            }

            let entry = self.state.next_entry()?;
            self.state.mark_visited(&entry.url);

            tracing::debug!(
                job_id = %self.job.id,
                url = %entry.url,
                depth = entry.depth,
                "Fetching page"
            );

            match self.fetcher.fetch(&entry.url, self.job.render_js()).await {
                Ok(page) => {
                    if visit_key(&page.final_url) != visit_key(&entry.url)
                        && !self.state.mark_visited(&page.final_url)
                    {
                        self.stats.duplicates += 1;
                        tracing::debug!(
                            job_id = %self.job.id,
                            url = %entry.url,
                            final_url = %page.final_url,
                            "Redirected to an already visited page, skipping"
                        );
                        continue;
                    }

                    self.stats.completed += 1;
                    return Some(self.handle_page(&entry, page));
                }
                Err(e) => {
                    self.stats.failed += 1;
                    tracing::warn!(
                        job_id = %self.job.id,
                        url = %entry.url,
                        depth = entry.depth,
                        "Fetch failed: {}",
                        e
                    );
                    return Some(PageResult::failed(&self.job.id, &entry, &e));
                }
            }
        }
    }

    /// Consumes the engine into a stream of results
    pub fn into_stream(self) -> impl Stream<Item = PageResult> + 'a
    where
        F: 'a,
    {
        stream::unfold(self, |mut engine| async move {
            let result = engine.next_result().await?;
            Some((result, engine))
        })
    }

    /// Builds the result for a fetched page and expands its links
    fn handle_page(&mut self, entry: &FrontierEntry, page: FetchedPage) -> PageResult {
        if entry.depth >= self.job.max_depth {
            let metadata = extract_metadata(&page.html);
            return PageResult::completed(&self.job.id, entry, &page, metadata, None);
        }

        let parsed = parse_html(&page.html, &page.final_url);
        let mut internal = 0;
        let mut queued = 0;

        for link in parsed.links {
            if !is_same_origin(&link, &self.job.starting_url, self.settings.origin_policy) {
                tracing::trace!(url = %link, "Dropping off-origin link");
                continue;
            }

            internal += 1;
            if self
                .state
                .enqueue(link, entry.depth + 1, Some(page.final_url.clone()))
            {
                queued += 1;
            }
        }

        tracing::debug!(
            job_id = %self.job.id,
            url = %page.final_url,
            internal_links = internal,
            queued,
            frontier = self.state.frontier_size(),
            "Expanded links"
        );

        PageResult::completed(&self.job.id, entry, &page, parsed.metadata, Some(internal))
    }

    fn page_cap_reached(&self) -> bool {
        match self.settings.max_pages {
            Some(cap) if self.stats.completed + self.stats.failed + self.stats.duplicates >= cap => {
                if !self.state.is_empty() {
                    tracing::warn!(
                        job_id = %self.job.id,
                        cap,
                        dropped = self.state.frontier_size(),
                        "Page cap reached, abandoning remaining frontier"
                    );
                }
                true
            }
            _ => false,
        }
    }
}
