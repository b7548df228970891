//! End-to-end crawls of a mock site with the real HTTP fetcher

use crate::support::{html_response, http_fetcher, mount_page, mount_page_once};
use crawl_worker::crawler::{CrawlEngine, EngineSettings};
use crawl_worker::job::{parse_job, Job, JobOptions};
use crawl_worker::output::PageResult;
use crawl_worker::state::PageStatus;
use futures::StreamExt;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn crawl(job: Job) -> Vec<PageResult> {
    let fetcher = http_fetcher();
    CrawlEngine::new(job, &fetcher, EngineSettings::default())
        .into_stream()
        .collect()
        .await
}

#[tokio::test]
async fn test_single_hop_crawl_stays_on_site() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page_once(
        &server,
        "/",
        r#"<html><head><title>Home</title></head>
           <body><a href="/p1">one</a><a href="http://b.test/">elsewhere</a></body></html>"#,
    )
    .await;
    mount_page_once(
        &server,
        "/p1",
        r#"<html><head><title>Page One</title>
           <meta name="description" content="The first page"></head>
           <body><h1>One</h1><a href="/p2">deeper</a></body></html>"#,
    )
    .await;

    let message = format!(
        r#"{{"id":"j1","starting_url":"{}/","max_depth":1}}"#,
        base
    );
    let results = crawl(parse_job(&message).unwrap()).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/p1", base)]);
    assert!(results.iter().all(|r| r.status == PageStatus::Completed));
    assert!(results.iter().all(|r| r.job_id == "j1"));

    let home = &results[0];
    assert_eq!(home.depth, 0);
    assert_eq!(home.parent_url, None);
    assert_eq!(home.internal_links_count, Some(1));
    assert_eq!(home.metadata.title.as_deref(), Some("Home"));

    let p1 = &results[1];
    assert_eq!(p1.depth, 1);
    assert_eq!(p1.parent_url.as_deref(), Some(format!("{}/", base).as_str()));
    assert_eq!(p1.metadata.description.as_deref(), Some("The first page"));
    assert_eq!(p1.metadata.h1.as_deref(), Some("One"));
    assert_eq!(p1.internal_links_count, None);
}

#[tokio::test]
async fn test_each_page_fetched_once() {
    let server = MockServer::start().await;

    mount_page_once(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    mount_page_once(&server, "/a", r#"<a href="/">home</a><a href="/b">b</a>"#).await;
    mount_page_once(&server, "/b", r#"<a href="/a#top">a</a><a href="/">home</a>"#).await;

    let job = Job::new(
        "cycle",
        &format!("{}/", server.uri()),
        5,
        JobOptions::default(),
    )
    .unwrap();
    let results = crawl(job).await;

    assert_eq!(results.len(), 3);
    let depths: Vec<u32> = results.iter().map(|r| r.depth).collect();
    assert_eq!(depths, vec![0, 1, 1]);
}

#[tokio::test]
async fn test_prefix_scopes_crawl_to_subtree() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page(
        &server,
        "/docs/",
        r#"<a href="intro">intro</a><a href="/blog/">blog</a>"#,
    )
    .await;
    mount_page(&server, "/docs/intro", "<title>Intro</title>").await;
    Mock::given(method("GET"))
        .and(path("/blog/"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let job = Job::new(
        "docs",
        &format!("{}/docs/", base),
        2,
        JobOptions::default(),
    )
    .unwrap();
    let results = crawl(job).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/docs/", base), format!("{}/docs/intro", base)]);
}

#[tokio::test]
async fn test_redirect_back_to_visited_page_is_not_reported() {
    let server = MockServer::start().await;
    let base = server.uri();

    // The redirect is followed over HTTP, so "/" is served twice.
    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(html_response(
            r#"<a href="/old">old</a><a href="/about">about</a>"#,
        ))
        .expect(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page_once(&server, "/about", "<title>About</title>").await;

    let job = Job::new("moved", &format!("{}/", base), 2, JobOptions::default()).unwrap();
    let results = crawl(job).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/about", base)]);
}

#[tokio::test]
async fn test_redirects_sharing_a_target_report_it_once() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_page_once(&server, "/", r#"<a href="/a">a</a><a href="/b">b</a>"#).await;
    for route in ["/a", "/b"] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(302).insert_header("Location", "/target"))
            .expect(1)
            .mount(&server)
            .await;
    }
    Mock::given(method("GET"))
        .and(path("/target"))
        .respond_with(html_response("<title>Target</title>"))
        .expect(2)
        .mount(&server)
        .await;

    let job = Job::new("shared", &format!("{}/", base), 1, JobOptions::default()).unwrap();
    let results = crawl(job).await;

    let urls: Vec<String> = results.iter().map(|r| r.url.clone()).collect();
    assert_eq!(urls, vec![format!("{}/", base), format!("{}/target", base)]);
    assert_eq!(results[1].parent_url.as_deref(), Some(format!("{}/", base).as_str()));
}

#[tokio::test]
async fn test_failed_seed_yields_one_failed_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let job = Job::new("down", &format!("{}/", server.uri()), 3, JobOptions::default()).unwrap();
    let results = crawl(job).await;

    assert_eq!(results.len(), 1);
    assert_eq!(results[0].status, PageStatus::Failed);
    assert_eq!(results[0].http_status, Some(500));

    let record: serde_json::Value = serde_json::from_str(&results[0].to_json().unwrap()).unwrap();
    assert_eq!(record["status"], "failed");
    assert_eq!(record["data"]["request_analysis"]["status"], 500);
    assert!(record["error"].as_str().unwrap().contains("500"));
}

#[tokio::test]
async fn test_broken_link_does_not_stop_job() {
    let server = MockServer::start().await;

    mount_page(&server, "/", r#"<a href="/gone">gone</a><a href="/here">here</a>"#).await;
    mount_page(&server, "/here", "<title>Here</title>").await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let job = Job::new("broken", &format!("{}/", server.uri()), 1, JobOptions::default()).unwrap();
    let results = crawl(job).await;

    let statuses: Vec<PageStatus> = results.iter().map(|r| r.status).collect();
    assert_eq!(
        statuses,
        vec![PageStatus::Completed, PageStatus::Failed, PageStatus::Completed]
    );
}

#[tokio::test]
async fn test_result_record_shape() {
    let server = MockServer::start().await;
    mount_page(
        &server,
        "/",
        r#"<html><head><title>Shop</title>
           <link rel="canonical" href="https://shop.test/"></head>
           <body><h1>Welcome</h1></body></html>"#,
    )
    .await;

    let job = Job::new("shape", &format!("{}/", server.uri()), 0, JobOptions::default()).unwrap();
    let results = crawl(job).await;
    let record: serde_json::Value = serde_json::from_str(&results[0].to_json().unwrap()).unwrap();

    assert_eq!(record["job_id"], "shape");
    assert_eq!(record["status"], "completed");
    assert!(record.get("error").is_none());
    assert_eq!(record["data"]["title"], "Shop");
    assert_eq!(record["data"]["meta"]["canonical"], "https://shop.test/");
    assert_eq!(record["data"]["content"]["h1"], "Welcome");
    assert_eq!(record["data"]["content"]["keywords"], serde_json::json!([]));
    assert_eq!(record["data"]["schema_suggestions"], serde_json::json!([]));
    assert!(record["data"]["metrics"]["load_time"].is_number());
    assert_eq!(record["data"]["depth"], 0);
    assert!(record["data"]["parent_url"].is_null());
    assert_eq!(record["data"]["request_analysis"]["status"], 200);
}
