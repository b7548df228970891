//! Crawl-Worker main entry point
//!
//! Command-line interface for a crawl worker process.

use anyhow::Context;
use clap::Parser;
use crawl_worker::config::{load_effective_config, Config, OriginPolicy};
use crawl_worker::crawler::HttpFetcher;
use crawl_worker::output::RedisResultSink;
use crawl_worker::queue::RedisJobQueue;
use crawl_worker::worker::JobQueueConsumer;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Crawl-Worker: a job-driven web crawler
///
/// Pops crawl jobs from a Redis list, walks each job's site breadth-first up
/// to its depth bound, and pushes one result record per page to another list.
#[derive(Parser, Debug)]
#[command(name = "crawl-worker")]
#[command(version = "1.0.0")]
#[command(about = "A job-driven web crawler worker", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(value_name = "CONFIG")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate and print the effective configuration without connecting
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    match &cli.config {
        Some(path) => tracing::info!("Loading configuration from: {}", path.display()),
        None => tracing::info!("No configuration file given, using defaults"),
    }

    let (config, hash) =
        load_effective_config(cli.config.as_deref()).context("Failed to load configuration")?;
    if let Some(hash) = hash {
        tracing::info!("Configuration loaded successfully (hash: {})", hash);
    }

    if cli.dry_run {
        handle_dry_run(&config);
        return Ok(());
    }

    run_worker(config).await
}

/// Sets up logging based on verbosity level
///
/// `RUST_LOG` takes precedence when neither `-v` nor `-q` is given.
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("crawl_worker=info,warn")),
            1 => EnvFilter::new("crawl_worker=debug,info"),
            2 => EnvFilter::new("crawl_worker=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: prints the effective configuration
fn handle_dry_run(config: &Config) {
    println!("=== Crawl-Worker Dry Run ===\n");

    println!("Job Queue:");
    println!("  Endpoint: {}", config.queue.redis_url());
    println!("  Key: {}", config.queue.jobs_key);
    println!("  Poll timeout: {}s", config.queue.poll_timeout_secs);

    println!("\nResult Sink:");
    println!("  Endpoint: {}", config.sink.redis_url());
    println!("  Key: {}", config.sink.results_key);

    println!("\nFetcher:");
    println!("  User agent: {}", config.fetcher.user_agent);
    println!("  Timeout: {}s", config.fetcher.timeout_secs);
    println!("  Connect timeout: {}s", config.fetcher.connect_timeout_secs);
    println!("  Max redirects: {}", config.fetcher.max_redirects);
    println!(
        "  Render endpoint: {}",
        config.fetcher.render_endpoint.as_deref().unwrap_or("(none, static only)")
    );

    println!("\nCrawler:");
    println!("  Default max depth: {}", config.crawler.default_max_depth);
    match config.crawler.max_pages_per_job {
        Some(cap) => println!("  Max pages per job: {}", cap),
        None => println!("  Max pages per job: unlimited"),
    }
    let policy = match config.crawler.origin_policy {
        OriginPolicy::Prefix => "prefix",
        OriginPolicy::Strict => "strict",
    };
    println!("  Origin policy: {}", policy);

    println!("\n✓ Configuration is valid");
}

/// Connects to Redis and consumes jobs until Ctrl-C
async fn run_worker(config: Config) -> anyhow::Result<()> {
    let fetcher = HttpFetcher::new(&config.fetcher).context("Failed to build HTTP fetcher")?;
    if config.fetcher.render_endpoint.is_some() {
        tracing::info!("JavaScript rendering enabled");
    }

    let queue = RedisJobQueue::connect(&config.queue)
        .await
        .with_context(|| format!("Failed to connect to job queue at {}", config.queue.redis_url()))?;
    tracing::info!("Connected to job queue '{}'", queue.key());

    let sink = RedisResultSink::connect(&config.sink)
        .await
        .with_context(|| format!("Failed to connect to result sink at {}", config.sink.redis_url()))?;
    tracing::info!("Connected to result sink '{}'", sink.key());

    let mut consumer = JobQueueConsumer::new(queue, sink, fetcher, config.crawler.clone());

    tokio::select! {
        _ = consumer.run_forever() => {
            tracing::warn!("Job queue closed unexpectedly");
        }
        result = tokio::signal::ctrl_c() => {
            result.context("Failed to listen for Ctrl-C")?;
            tracing::info!("Received Ctrl-C, shutting down");
        }
    }

    Ok(())
}
