//! Consumer loop with in-memory queue and sink and a mock site

use crate::support::{http_fetcher, job_message, mount_page, MemoryQueue, MemorySink};
use crawl_worker::config::CrawlerConfig;
use crawl_worker::state::PageStatus;
use crawl_worker::worker::{JobOutcome, JobQueueConsumer};
use std::time::Duration;
use wiremock::MockServer;

async fn site() -> MockServer {
    let server = MockServer::start().await;
    mount_page(&server, "/", r#"<title>Root</title><a href="/child">child</a>"#).await;
    mount_page(&server, "/child", "<title>Child</title>").await;
    server
}

#[tokio::test]
async fn test_malformed_job_between_valid_jobs() {
    let server = site().await;
    let start = format!("{}/", server.uri());
    let sink = MemorySink::default();

    let queue = MemoryQueue::new(vec![
        job_message("first", &start, 1),
        r#"{"starting_url": "missing id"}"#.to_string(),
        job_message("second", &start, 0),
    ]);
    let mut consumer =
        JobQueueConsumer::new(queue, sink.clone(), http_fetcher(), CrawlerConfig::default());
    consumer.run_forever().await;

    assert_eq!(sink.results_for("first").len(), 2);
    assert_eq!(sink.results_for("second").len(), 1);
    assert_eq!(sink.results().len(), 3);
    assert!(sink
        .results()
        .iter()
        .all(|r| r.status == PageStatus::Completed));
}

#[tokio::test]
async fn test_invalid_starting_url_is_dropped() {
    let server = site().await;
    let sink = MemorySink::default();

    let queue = MemoryQueue::new(vec![
        job_message("ftp", "ftp://files.test/", 1),
        job_message("relative", "/just/a/path", 1),
        job_message("ok", &format!("{}/", server.uri()), 0),
    ]);
    let mut consumer =
        JobQueueConsumer::new(queue, sink.clone(), http_fetcher(), CrawlerConfig::default());

    assert!(matches!(
        consumer.process_next().await.unwrap(),
        Some(JobOutcome::Malformed(_))
    ));
    assert!(matches!(
        consumer.process_next().await.unwrap(),
        Some(JobOutcome::Malformed(_))
    ));
    assert!(matches!(
        consumer.process_next().await.unwrap(),
        Some(JobOutcome::Completed(_))
    ));
    assert!(consumer.process_next().await.unwrap().is_none());

    let ids: Vec<String> = sink.results().into_iter().map(|r| r.job_id).collect();
    assert_eq!(ids, vec!["ok"]);
}

#[tokio::test]
async fn test_sink_failure_moves_on_to_next_job() {
    let server = site().await;
    let start = format!("{}/", server.uri());
    let sink = MemorySink::rejecting("lost");

    let queue = MemoryQueue::new(vec![job_message("lost", &start, 1), job_message("kept", &start, 1)]);
    let mut consumer = JobQueueConsumer::new(queue, sink.clone(), http_fetcher(), CrawlerConfig::default())
        .with_error_backoff(Duration::from_millis(10));

    match consumer.process_next().await.unwrap() {
        Some(JobOutcome::Failed { job_id, .. }) => assert_eq!(job_id, "lost"),
        other => panic!("expected failed job, got {:?}", other),
    }
    consumer.run_forever().await;

    assert!(sink.results_for("lost").is_empty());
    assert_eq!(sink.results_for("kept").len(), 2);
}

#[tokio::test]
async fn test_results_streamed_in_crawl_order() {
    let server = site().await;
    let sink = MemorySink::default();

    let queue = MemoryQueue::new(vec![job_message("order", &format!("{}/", server.uri()), 3)]);
    let mut consumer =
        JobQueueConsumer::new(queue, sink.clone(), http_fetcher(), CrawlerConfig::default());

    match consumer.process_next().await.unwrap() {
        Some(JobOutcome::Completed(summary)) => {
            assert_eq!(summary.pages_completed, 2);
            assert_eq!(summary.pages_failed, 0);
        }
        other => panic!("expected completed job, got {:?}", other),
    }

    let depths: Vec<u32> = sink.results().iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1]);
}

#[tokio::test]
async fn test_page_cap_from_config() {
    let server = site().await;
    let sink = MemorySink::default();
    let crawler = CrawlerConfig {
        max_pages_per_job: Some(1),
        ..CrawlerConfig::default()
    };

    let queue = MemoryQueue::new(vec![job_message("capped", &format!("{}/", server.uri()), 3)]);
    let mut consumer = JobQueueConsumer::new(queue, sink.clone(), http_fetcher(), crawler);
    consumer.run_forever().await;

    assert_eq!(sink.results().len(), 1);
}
