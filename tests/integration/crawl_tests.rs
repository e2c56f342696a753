//! Integration tests for the crawler
//!
//! These tests use wiremock to create mock HTTP servers and test
//! the full crawl cycle end-to-end.

use chrono::NaiveDate;
use docs_harvester::config::{parse_config, Config};
use docs_harvester::crawler::{run_crawl, CrawlOutput, CrawlSession};
use docs_harvester::output::{aggregate_at, JsonOutput, OutputHandler};
use docs_harvester::state::PageState;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FILLER: &str = "This page walks through integrating the mini dapp SDK with the portal.";

/// Creates a test configuration for a crawl of `server`
///
/// `crawler_extra` and `retry_extra` are appended to the respective tables.
fn create_test_config(
    server: &MockServer,
    seed_path: &str,
    crawler_extra: &str,
    retry_extra: &str,
) -> Config {
    // Defaults for keys not overridden by `crawler_extra` (TOML rejects duplicate keys)
    let crawler_defaults: String = [("max-depth", "3"), ("fetch-timeout-secs", "5")]
        .iter()
        .filter(|(key, _)| {
            !crawler_extra
                .lines()
                .any(|line| line.split('=').next().map(str::trim) == Some(*key))
        })
        .map(|(key, value)| format!("{} = {}\n", key, value))
        .collect();
    let toml = format!(
        r#"
[crawler]
seeds = ["{base}{seed}"]
allowed-domains = ["127.0.0.1"]
{crawler_defaults}{crawler_extra}

[politeness]
delay-ms = 0
jitter-ms = 0

[retry]
backoff-ms = 1
max-backoff-ms = 5
{retry_extra}

[user-agent]
crawler-name = "TestBot"
crawler-version = "1.0.0"
contact-url = "https://example.com/contact"
contact-email = "test@example.com"

[output]
directory = "out"
reports-directory = "out/structured"
"#,
        base = server.uri(),
        seed = seed_path,
        crawler_defaults = crawler_defaults,
        crawler_extra = crawler_extra,
        retry_extra = retry_extra,
    );
    parse_config(&toml).expect("test config should be valid")
}

/// An HTML page with a title, enough paragraph text and the given links
fn page(title: &str, links: &[&str]) -> ResponseTemplate {
    let anchors: String = links
        .iter()
        .map(|href| format!(r#"<a href="{}">Link to {}</a>"#, href, href))
        .collect();
    let html = format!(
        "<html><head><title>{title}</title></head><body><main>\
         <h1>{title}</h1><p>{FILLER}</p>{anchors}</main></body></html>"
    );
    ResponseTemplate::new(200).set_body_raw(html, "text/html; charset=utf-8")
}

async fn mount_page(server: &MockServer, route: &str, title: &str, links: &[&str], expect: u64) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(page(title, links))
        .expect(expect)
        .mount(server)
        .await;
}

fn item_urls(output: &CrawlOutput) -> Vec<String> {
    output
        .records
        .documentation_items
        .iter()
        .map(|item| url::Url::parse(&item.url).unwrap().path().to_string())
        .collect()
}

fn skipped_state(output: &CrawlOutput, route: &str) -> Option<PageState> {
    output
        .skipped
        .iter()
        .find(|s| url::Url::parse(&s.url).unwrap().path() == route)
        .map(|s| s.state)
}

#[tokio::test]
async fn test_full_crawl_single_domain() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nAllow: /"))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/", "Home", &["/page1", "/page2"], 1).await;
    mount_page(&server, "/page1", "Page One", &["/", "/page2"], 1).await;
    mount_page(&server, "/page2", "Page Two", &[], 1).await;

    let config = create_test_config(&server, "/", "", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/page1", "/page2"]);
    assert!(output.skipped.is_empty());
    assert_eq!(output.summary.pages_fetched, 3);
    assert_eq!(output.summary.pages_in(PageState::Processed), 3);
    assert!(!output.summary.cancelled);

    let home = &output.records.documentation_items[0];
    assert_eq!(home.title, "Home");
    assert!(home.content_length >= 50);
    assert!(output
        .records
        .links
        .iter()
        .any(|link| link.url.ends_with("/page1") && link.is_internal));
}

#[tokio::test]
async fn test_fragments_collapse_to_one_fetch() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/",
        "Home",
        &["/guide#intro", "/guide#setup", "/guide/"],
        1,
    )
    .await;
    mount_page(&server, "/guide", "Guide", &["/#top"], 1).await;

    let output = run_crawl(create_test_config(&server, "/", "", "")).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/guide"]);
}

#[tokio::test]
async fn test_retry_then_success_emits_one_item() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/flaky"], 1).await;
    Mock::given(method("GET"))
        .and(path("/flaky"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/flaky", "Flaky", &[], 1).await;

    let output = run_crawl(create_test_config(&server, "/", "", "")).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/flaky"]);
    assert!(output.skipped.is_empty());
    assert_eq!(output.summary.skipped_urls, 0);
}

#[tokio::test]
async fn test_retries_exhausted_recorded() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/down"], 1).await;
    Mock::given(method("GET"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", "", "max-retries = 2");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/"]);
    assert_eq!(skipped_state(&output, "/down"), Some(PageState::RetriesExhausted));
    assert_eq!(output.summary.pages_in(PageState::RetriesExhausted), 1);
}

#[tokio::test]
async fn test_dont_retry_attempts_once() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/once"], 1).await;
    Mock::given(method("GET"))
        .and(path("/once"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", "dont-retry = ['^/once']", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(skipped_state(&output, "/once"), Some(PageState::Failed));
}

#[tokio::test]
async fn test_dead_link_does_not_abort() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/missing", "/page"], 1).await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;
    mount_page(&server, "/page", "Page", &[], 1).await;

    let output = run_crawl(create_test_config(&server, "/", "", "")).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/page"]);
    assert_eq!(skipped_state(&output, "/missing"), Some(PageState::DeadLink));
}

#[tokio::test]
async fn test_deny_takes_precedence_over_allow() {
    let server = MockServer::start().await;

    mount_page(
        &server,
        "/docs/index",
        "Docs",
        &["/docs/public", "/docs/private/secret", "/blog/post"],
        1,
    )
    .await;
    mount_page(&server, "/docs/public", "Public", &[], 1).await;
    mount_page(&server, "/docs/private/secret", "Secret", &[], 0).await;
    mount_page(&server, "/blog/post", "Blog", &[], 0).await;

    let config = create_test_config(
        &server,
        "/docs/index",
        "allow = ['^/docs']\ndeny = ['^/docs/private']",
        "",
    );
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/docs/index", "/docs/public"]);
}

#[tokio::test]
async fn test_deny_trailing_slash_pattern() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/api/", "/admin/", "/guide/"], 1).await;
    mount_page(&server, "/api", "API", &[], 0).await;
    mount_page(&server, "/admin", "Admin", &[], 0).await;
    mount_page(&server, "/guide", "Guide", &[], 1).await;

    let config = create_test_config(&server, "/", "deny = ['/api/', '/admin/']", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/guide"]);
    assert_eq!(output.summary.pages_fetched, 2);
}

#[tokio::test]
async fn test_seed_outside_allow_patterns_still_fetched() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/mini-dapp/", "/blog/post"], 1).await;
    mount_page(&server, "/mini-dapp", "Mini Dapp", &["/mini-dapp/sdk/intro"], 1).await;
    mount_page(&server, "/mini-dapp/sdk/intro", "SDK Intro", &[], 1).await;
    mount_page(&server, "/blog/post", "Blog", &[], 0).await;

    let config = create_test_config(
        &server,
        "/",
        "allow = ['/mini-dapp/', '/dapp-portal/']\ndeny = ['/api/']",
        "",
    );
    let output = run_crawl(config).await.unwrap();

    assert_eq!(
        item_urls(&output),
        vec!["/", "/mini-dapp", "/mini-dapp/sdk/intro"]
    );
}

#[tokio::test]
async fn test_depth_bound() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Root", &["/level1"], 1).await;
    mount_page(&server, "/level1", "Level One", &["/level2"], 1).await;
    mount_page(&server, "/level2", "Level Two", &[], 0).await;

    let config = create_test_config(&server, "/", "max-depth = 1", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/level1"]);
}

#[tokio::test]
async fn test_oversized_and_non_html_skipped() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/huge", "/manual.pdf"], 1).await;
    Mock::given(method("GET"))
        .and(path("/huge"))
        .respond_with(
            ResponseTemplate::new(200).set_body_raw("<p>x</p>".repeat(4096), "text/html"),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/manual.pdf"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("%PDF-1.4", "application/pdf"))
        .expect(1)
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", "max-page-bytes = 8192", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/"]);
    assert_eq!(skipped_state(&output, "/huge"), Some(PageState::Oversized));
    assert_eq!(
        skipped_state(&output, "/manual.pdf"),
        Some(PageState::ContentMismatch)
    );
}

#[tokio::test]
async fn test_robots_disallow_prevents_fetch() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /private"),
        )
        .mount(&server)
        .await;
    mount_page(&server, "/", "Home", &["/private/page", "/public"], 1).await;
    mount_page(&server, "/private/page", "Private", &[], 0).await;
    mount_page(&server, "/public", "Public", &[], 1).await;

    let output = run_crawl(create_test_config(&server, "/", "", "")).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/", "/public"]);
    assert_eq!(
        skipped_state(&output, "/private/page"),
        Some(PageState::RobotsDenied)
    );
}

#[tokio::test]
async fn test_robots_ignored_when_disabled() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/robots.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("User-agent: *\nDisallow: /"))
        .expect(0)
        .mount(&server)
        .await;
    mount_page(&server, "/", "Home", &[], 1).await;

    let config = create_test_config(&server, "/", "obey-robots = false", "");
    let output = run_crawl(config).await.unwrap();

    assert_eq!(item_urls(&output), vec!["/"]);
}

#[tokio::test]
async fn test_cancel_before_start_returns_empty() {
    let server = MockServer::start().await;
    mount_page(&server, "/", "Home", &[], 0).await;

    let session = CrawlSession::new(create_test_config(&server, "/", "", "")).unwrap();
    session.cancel_handle().cancel();
    let output = session.run().await.unwrap();

    assert!(output.records.is_empty());
    assert!(output.summary.cancelled);
    assert_eq!(output.summary.pages_in(PageState::Queued), 1);
}

#[tokio::test]
async fn test_cancel_abandons_in_flight_and_keeps_records() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/slow"], 1).await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(page("Slow", &[]).set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let config = create_test_config(&server, "/", "fetch-timeout-secs = 60", "");
    let session = CrawlSession::new(config).unwrap();
    let cancel = session.cancel_handle();

    let (output, _) = tokio::time::timeout(Duration::from_secs(10), async {
        tokio::join!(session.run(), async {
            tokio::time::sleep(Duration::from_millis(500)).await;
            cancel.cancel();
        })
    })
    .await
    .expect("cancellation should stop the crawl promptly");
    let output = output.unwrap();

    assert_eq!(item_urls(&output), vec!["/"]);
    assert_eq!(skipped_state(&output, "/slow"), Some(PageState::Abandoned));
    assert!(output.summary.cancelled);
}

#[tokio::test]
async fn test_persisted_records_reproduce_corpus() {
    let server = MockServer::start().await;

    mount_page(&server, "/", "Home", &["/mini-dapp/sdk/"], 1).await;
    mount_page(&server, "/mini-dapp/sdk", "SDK Overview", &[], 1).await;

    let output = run_crawl(create_test_config(&server, "/", "", "")).await.unwrap();

    let dir = TempDir::new().unwrap();
    let json = JsonOutput::new(dir.path());
    let at = NaiveDate::from_ymd_opt(2024, 5, 1)
        .unwrap()
        .and_hms_opt(10, 0, 0)
        .unwrap();
    let corpus = aggregate_at(&output.records, at);

    json.write_records(&output.records).unwrap();
    json.write_corpus(&corpus).unwrap();
    json.write_summary(&output.summary).unwrap();

    let reloaded = json.load_records().unwrap();
    assert_eq!(reloaded, output.records);
    assert_eq!(aggregate_at(&reloaded, at), json.load_corpus().unwrap());
    assert_eq!(json.load_summary().unwrap(), output.summary);

    assert!(corpus.sections.contains_key("Mini Dapp Development"));
    assert_eq!(corpus.page_types["mini_dapp"].len(), 1);
}
