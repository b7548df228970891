//! HttpFetcher against a mock HTTP server

use crate::support::{html_response, http_fetcher, http_fetcher_with, mount_page};
use crawl_worker::config::FetcherConfig;
use crawl_worker::crawler::{FetchError, PageFetcher};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn page_url(server: &MockServer, route: &str) -> Url {
    Url::parse(&format!("{}{}", server.uri(), route)).unwrap()
}

#[tokio::test]
async fn test_fetch_html_page() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<html><title>Home</title></html>").await;

    let url = page_url(&server, "/");
    let page = http_fetcher().fetch(&url, false).await.unwrap();

    assert_eq!(page.status, 200);
    assert_eq!(page.final_url, url);
    assert!(page.html.contains("<title>Home</title>"));
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = http_fetcher()
        .fetch(&page_url(&server, "/missing"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Status { status: 404, .. }));
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn test_server_error_is_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let err = http_fetcher()
        .fetch(&page_url(&server, "/"), false)
        .await
        .unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_non_html_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/logo.png"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(vec![0x89, 0x50, 0x4e, 0x47], "image/png"))
        .mount(&server)
        .await;

    let err = http_fetcher()
        .fetch(&page_url(&server, "/logo.png"), false)
        .await
        .unwrap_err();

    match err {
        FetchError::NotHtml { content_type, .. } => assert_eq!(content_type, "image/png"),
        other => panic!("expected NotHtml, got {:?}", other),
    }
}

#[tokio::test]
async fn test_redirect_reports_final_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(ResponseTemplate::new(301).insert_header("Location", "/new"))
        .mount(&server)
        .await;
    mount_page(&server, "/new", "<h1>Moved</h1>").await;

    let page = http_fetcher()
        .fetch(&page_url(&server, "/old"), false)
        .await
        .unwrap();

    assert_eq!(page.final_url, page_url(&server, "/new"));
    assert!(page.html.contains("Moved"));
}

#[tokio::test]
async fn test_redirect_limit() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/loop"))
        .respond_with(ResponseTemplate::new(302).insert_header("Location", "/loop"))
        .mount(&server)
        .await;

    let fetcher = http_fetcher_with(FetcherConfig {
        max_redirects: 3,
        ..FetcherConfig::default()
    });
    let err = fetcher
        .fetch(&page_url(&server, "/loop"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::RedirectLimit { .. }));
}

#[tokio::test]
async fn test_timeout() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(html_response("<p>slow</p>").set_delay(Duration::from_secs(3)))
        .mount(&server)
        .await;

    let fetcher = http_fetcher_with(FetcherConfig {
        timeout_secs: 1,
        connect_timeout_secs: 1,
        ..FetcherConfig::default()
    });
    let err = fetcher
        .fetch(&page_url(&server, "/"), false)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Timeout { .. }));
}

#[tokio::test]
async fn test_render_goes_through_render_endpoint() {
    let site = MockServer::start().await;
    let renderer = MockServer::start().await;
    let url = page_url(&site, "/app");

    Mock::given(method("POST"))
        .and(path("/render"))
        .and(body_json(serde_json::json!({ "url": url.as_str() })))
        .respond_with(html_response("<title>Rendered</title>"))
        .expect(1)
        .mount(&renderer)
        .await;

    let fetcher = http_fetcher_with(FetcherConfig {
        render_endpoint: Some(format!("{}/render", renderer.uri())),
        ..FetcherConfig::default()
    });
    let page = fetcher.fetch(&url, true).await.unwrap();

    assert_eq!(page.final_url, url);
    assert!(page.html.contains("Rendered"));
}

#[tokio::test]
async fn test_render_failure_is_render_error() {
    let renderer = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&renderer)
        .await;

    let fetcher = http_fetcher_with(FetcherConfig {
        render_endpoint: Some(format!("{}/render", renderer.uri())),
        ..FetcherConfig::default()
    });
    let err = fetcher
        .fetch(&Url::parse("http://a.test/").unwrap(), true)
        .await
        .unwrap_err();

    assert!(matches!(err, FetchError::Render { .. }));
}

#[tokio::test]
async fn test_render_without_endpoint_fetches_statically() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "<title>Static</title>").await;

    let page = http_fetcher()
        .fetch(&page_url(&server, "/"), true)
        .await
        .unwrap();
    assert!(page.html.contains("Static"));
}

#[tokio::test]
async fn test_static_fetch_ignores_render_endpoint() {
    let site = MockServer::start().await;
    let renderer = MockServer::start().await;
    mount_page(&site, "/", "<title>Static</title>").await;
    Mock::given(method("POST"))
        .respond_with(html_response("<title>Rendered</title>"))
        .expect(0)
        .mount(&renderer)
        .await;

    let fetcher = http_fetcher_with(FetcherConfig {
        render_endpoint: Some(format!("{}/render", renderer.uri())),
        ..FetcherConfig::default()
    });
    let page = fetcher.fetch(&page_url(&site, "/"), false).await.unwrap();
    assert!(page.html.contains("Static"));
}
