use serde::Deserialize;

/// Main configuration structure for the crawl worker
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub queue: QueueConfig,
    pub sink: SinkConfig,
    pub fetcher: FetcherConfig,
    pub crawler: CrawlerConfig,
}

/// Job queue connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct QueueConfig {
    /// Redis host holding the job list
    pub host: String,

    /// Redis port
    pub port: u16,

    /// Redis logical database index
    pub db: i64,

    /// Name of the list jobs are popped from
    pub jobs_key: String,

    /// Seconds a single BLPOP waits before it is reissued
    pub poll_timeout_secs: u64,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            jobs_key: "crawler:jobs".to_string(),
            poll_timeout_secs: 5,
        }
    }
}

impl QueueConfig {
    /// Redis connection URL for this endpoint
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// Result sink connection configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct SinkConfig {
    /// Redis host holding the result list
    pub host: String,

    /// Redis port
    pub port: u16,

    /// Redis logical database index
    pub db: i64,

    /// Name of the list results are appended to
    pub results_key: String,
}

impl Default for SinkConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 6379,
            db: 0,
            results_key: "crawler:results".to_string(),
        }
    }
}

impl SinkConfig {
    /// Redis connection URL for this endpoint
    pub fn redis_url(&self) -> String {
        format!("redis://{}:{}/{}", self.host, self.port, self.db)
    }
}

/// HTTP fetcher configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct FetcherConfig {
    /// User-Agent header sent with every request
    pub user_agent: String,

    /// Total request timeout in seconds
    pub timeout_secs: u64,

    /// Connection establishment timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum redirect hops followed per fetch
    pub max_redirects: usize,

    /// Rendering service used when a job asks for JavaScript rendering
    pub render_endpoint: Option<String>,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            user_agent: "Mozilla/5.0 (compatible; CrawlWorker/1.0)".to_string(),
            timeout_secs: 30,
            connect_timeout_secs: 10,
            max_redirects: 10,
            render_endpoint: None,
        }
    }
}

/// Crawl behaviour shared by every job this worker runs
#[derive(Debug, Clone, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct CrawlerConfig {
    /// Depth used when a job message carries no `max_depth`
    pub default_max_depth: u32,

    /// Upper bound on pages fetched for a single job (unbounded when absent)
    pub max_pages_per_job: Option<u32>,

    /// How discovered links are matched against the job's starting URL
    pub origin_policy: OriginPolicy,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            default_max_depth: 3,
            max_pages_per_job: None,
            origin_policy: OriginPolicy::Prefix,
        }
    }
}

/// Same-origin test applied to discovered links
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OriginPolicy {
    /// The link's absolute form starts with the starting URL string
    #[default]
    Prefix,

    /// Prefix match plus identical scheme, host and port
    Strict,
}
