//! Integration tests for the crawler
//!
//! These tests use wiremock to serve a small site over real HTTP and run the
//! full cycle end-to-end: fetch, convert, follow links, write output.

use std::time::Duration;
use tempfile::TempDir;
use web_context_builder::config::{CrawlConfig, CrawlConfigBuilder};
use web_context_builder::output::write_output;
use web_context_builder::{run_crawl, FailureReason, PageStatus};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn html_page(title: &str, body: &str) -> String {
    format!(
        "<html><head><title>{}</title></head><body><main><h1>{}</h1>{}</main></body></html>",
        title, title, body
    )
}

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

fn test_config(server: &MockServer, out: &TempDir) -> CrawlConfigBuilder {
    CrawlConfigBuilder::new()
        .root_url(format!("{}/", server.uri()))
        .output_dir(out.path())
        .delay_secs(0.0)
        .timeout_secs(5.0)
        .max_concurrent(3)
}

fn build(builder: CrawlConfigBuilder) -> CrawlConfig {
    builder.build().expect("valid test config")
}

/// Root page linking to two content pages, a 404 and a JSON endpoint
async fn mount_small_site(server: &MockServer) {
    mount_html(
        server,
        "/",
        html_page(
            "Home",
            r#"<p>Welcome to the docs.</p>
            <a href="/guide">Guide</a>
            <a href="/reference">Reference</a>
            <a href="/missing">Missing</a>
            <a href="/data">Data</a>
            <a href="https://elsewhere.invalid/page">External</a>"#,
        ),
    )
    .await;

    mount_html(
        server,
        "/guide",
        html_page(
            "Guide",
            r#"<p>Start here.</p><a href="/">Home</a><a href="/reference">Reference</a>"#,
        ),
    )
    .await;

    mount_html(
        server,
        "/reference",
        html_page("Reference", "<p>All the functions.</p>"),
    )
    .await;

    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/data"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(r#"{"ok":true}"#, "application/json"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_full_crawl_writes_pages_and_merged_document() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let out = TempDir::new().unwrap();

    let config = build(test_config(&server, &out).merged_filename("site.md"));
    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert!(!report.cancelled);
    assert_eq!(report.stats.crawled, 3, "home, guide and reference");
    assert_eq!(report.stats.failed, 2, "404 and JSON");
    assert_eq!(report.pages.len(), 5);

    let written = write_output(&config, &report.pages).expect("Failed to write output");
    assert_eq!(written.pages.len(), 3);
    for file in &written.pages {
        assert!(file.exists(), "{} should exist", file.display());
        assert!(file.starts_with(config.pages_dir()));
    }

    let merged_path = written.merged.expect("merged document written");
    assert_eq!(merged_path, out.path().join("site.md"));

    let merged = std::fs::read_to_string(&merged_path).unwrap();
    assert!(merged.starts_with("# Merged Documentation"));
    assert!(merged.contains("**Total Pages:** 3"));
    assert!(merged.contains("Start here."));
    assert!(merged.contains("All the functions."));
}

#[tokio::test]
async fn test_failures_are_classified() {
    let server = MockServer::start().await;
    mount_small_site(&server).await;
    let out = TempDir::new().unwrap();

    let report = run_crawl(build(test_config(&server, &out)))
        .await
        .expect("Crawl failed");

    let reason_for = |suffix: &str| {
        report
            .pages
            .iter()
            .find(|p| p.url.path() == suffix)
            .and_then(|p| p.status.failure().cloned())
    };

    assert_eq!(reason_for("/missing"), Some(FailureReason::HttpStatus(404)));
    assert!(matches!(
        reason_for("/data"),
        Some(FailureReason::NotHtml(ct)) if ct.contains("json")
    ));

    // Out-of-scope link is never attempted
    assert!(report
        .pages
        .iter()
        .all(|p| p.url.host_str() != Some("elsewhere.invalid")));
}

#[tokio::test]
async fn test_every_page_crawled_once() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(
            html_page(
                "Home",
                r#"<a href="/a">A</a><a href="/a/">A again</a><a href="/a#top">A top</a>"#,
            ),
            "text/html",
        ))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/a"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("A", r#"<a href="/">Back</a>"#), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = run_crawl(build(test_config(&server, &out)))
        .await
        .expect("Crawl failed");

    assert_eq!(report.stats.crawled, 2);
    assert_eq!(report.stats.failed, 0);
}

#[tokio::test]
async fn test_max_depth_respected() {
    let server = MockServer::start().await;

    mount_html(&server, "/", html_page("Root", r#"<a href="/one">One</a>"#)).await;
    mount_html(&server, "/one", html_page("One", r#"<a href="/two">Two</a>"#)).await;

    Mock::given(method("GET"))
        .and(path("/two"))
        .respond_with(ResponseTemplate::new(200).set_body_raw(html_page("Two", ""), "text/html"))
        .expect(0)
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = run_crawl(build(test_config(&server, &out).max_depth(Some(1))))
        .await
        .expect("Crawl failed");

    assert_eq!(report.stats.crawled, 2);
    let depths: Vec<u32> = report.pages.iter().map(|p| p.depth).collect();
    assert!(depths.iter().all(|d| *d <= 1));
}

#[tokio::test]
async fn test_slow_page_times_out() {
    let server = MockServer::start().await;

    mount_html(&server, "/", html_page("Root", r#"<a href="/slow">Slow</a>"#)).await;

    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(html_page("Slow", "<p>eventually</p>"), "text/html")
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let report = run_crawl(build(test_config(&server, &out).timeout_secs(0.5)))
        .await
        .expect("Crawl failed");

    let slow = report
        .pages
        .iter()
        .find(|p| p.url.path() == "/slow")
        .expect("slow page recorded");
    assert_eq!(slow.status, PageStatus::Failed(FailureReason::Timeout));
    assert_eq!(report.stats.crawled, 1);
}

#[tokio::test]
async fn test_redirect_is_recorded_under_final_url() {
    let server = MockServer::start().await;

    mount_html(&server, "/", html_page("Root", r#"<a href="/old">Old</a>"#)).await;

    Mock::given(method("GET"))
        .and(path("/old"))
        .respond_with(
            ResponseTemplate::new(301).insert_header("Location", format!("{}/new", server.uri())),
        )
        .mount(&server)
        .await;

    mount_html(&server, "/new", html_page("New", "<p>Moved content.</p>")).await;

    let out = TempDir::new().unwrap();
    let report = run_crawl(build(test_config(&server, &out)))
        .await
        .expect("Crawl failed");

    assert_eq!(report.stats.crawled, 2);
    let moved = report
        .pages
        .iter()
        .find(|p| p.url.path() == "/new")
        .expect("redirect target recorded");
    assert!(moved.is_success());
    assert!(moved.markdown.contains("Moved content."));
    assert!(report.pages.iter().all(|p| p.url.path() != "/old"));
}

#[tokio::test]
async fn test_unreachable_root_writes_nothing() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let out = TempDir::new().unwrap();
    let config = build(test_config(&server, &out));
    let report = run_crawl(config.clone()).await.expect("Crawl failed");

    assert_eq!(report.stats.crawled, 0);
    assert_eq!(report.stats.failed, 1);

    let written = write_output(&config, &report.pages).unwrap();
    assert!(written.pages.is_empty());
    assert!(written.merged.is_none());
    assert!(!config.merged_path().exists());
}
