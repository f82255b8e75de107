//! Integration tests for the crawler
//!
//! These tests use wiremock to stand in for the code-hosting site and run
//! full searches end-to-end through the real HTTP client.

use github_crawler::config::{parse_input, SearchKind, SearchRequest};
use github_crawler::crawler::{Crawler, Fetch, GithubClient, ACCEPT_HTML, USER_AGENT};
use github_crawler::output::{format_json_report, SearchReport};
use github_crawler::FetchError;
use std::time::Duration;
use url::Url;
use wiremock::matchers::{any, header, headers, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Builds a crawler whose client talks to the mock server directly
fn create_crawler(server: &MockServer) -> Crawler {
    let base_url = Url::parse(&server.uri()).expect("Failed to parse mock server URI");
    let client = GithubClient::with_base_url(&[], base_url).expect("Failed to build client");
    Crawler::from_client(client)
}

fn create_request(keywords: &[&str], kind: SearchKind, enrich: bool) -> SearchRequest {
    let keywords = keywords.iter().map(|k| k.to_string()).collect();
    SearchRequest::new(keywords, kind, vec![], enrich).expect("Failed to build request")
}

fn html(body: String) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .set_body_string(body)
        .insert_header("content-type", "text/html")
}

fn repo_page(languages: &[(&str, &str)]) -> String {
    let entries: String = languages
        .iter()
        .map(|(name, pct)| {
            format!(
                r##"<li class="d-inline"><a href="#"><span class="color-fg-default">{}</span> <span>{}</span></a></li>"##,
                name, pct
            )
        })
        .collect();
    format!(
        r#"<html><body><div class="Layout-sidebar"><h2>Languages</h2><ul>{}</ul></div></body></html>"#,
        entries
    )
}

#[tokio::test]
async fn test_search_without_enrichment() {
    let mock_server = MockServer::start().await;
    let base_url = mock_server.uri();

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "python django"))
        .and(query_param("type", "repositories"))
        .respond_with(html(format!(
            r#"<html><body>
            <div class="search-title"><a href="/django/django">django</a></div>
            <div class="search-title"><a href="{}/encode/django-rest-framework">drf</a></div>
            </body></html>"#,
            base_url
        )))
        .expect(1)
        .mount(&mock_server)
        .await;

    let input = parse_input(
        r#"{"keywords": ["python", "django"], "proxies": [], "type": "repositories", "includeExtraInfo": false}"#,
    )
    .expect("Valid input");
    let request = SearchRequest::from_input(&input).expect("Valid request");

    let crawler = create_crawler(&mock_server);
    let results = crawler.execute(&request).await;

    assert_eq!(results.len(), 2);
    assert_eq!(results[0].url, format!("{}/django/django", base_url));
    assert_eq!(
        results[1].url,
        format!("{}/encode/django-rest-framework", base_url)
    );
    assert!(results.iter().all(|r| r.extra.is_none()));

    // Only the search request was made
    mock_server.verify().await;
}

#[tokio::test]
async fn test_search_with_enrichment_and_partial_failure() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(
            r#"<html><body>
            <div class="search-title"><a href="/alice/one">one</a></div>
            <div class="search-title"><a href="/bob/two">two</a></div>
            <div class="search-title"><a href="/carol/three">three</a></div>
            </body></html>"#
                .to_string(),
        ))
        .mount(&mock_server)
        .await;

    // The first repository is slowest, so completion order is reversed
    Mock::given(method("GET"))
        .and(path("/alice/one"))
        .respond_with(
            html(repo_page(&[("Rust", "91.2%"), ("Shell", "8.8%")]))
                .set_delay(Duration::from_millis(200)),
        )
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/bob/two"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/carol/three"))
        .respond_with(html(repo_page(&[("Python", "100%")])))
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(&mock_server);
    let request = create_request(&["rust"], SearchKind::Repositories, true);
    let results = crawler.execute(&request).await;

    assert_eq!(results.len(), 3);
    assert!(results[0].url.ends_with("/alice/one"));
    assert!(results[1].url.ends_with("/bob/two"));
    assert!(results[2].url.ends_with("/carol/three"));

    let first = results[0].extra.as_ref().expect("first enriched");
    assert_eq!(first.owner, "alice");
    assert_eq!(first.language_stats.get("Rust"), Some(&91.2));
    assert_eq!(first.language_stats.get("Shell"), Some(&8.8));

    assert!(results[1].extra.is_none());

    let third = results[2].extra.as_ref().expect("third enriched");
    assert_eq!(third.owner, "carol");
    assert_eq!(third.language_stats.get("Python"), Some(&100.0));

    // The report omits `extra` for the failed result only
    let report = SearchReport::new(&request, results);
    let json: serde_json::Value =
        serde_json::from_str(&format_json_report(&report).unwrap()).unwrap();
    assert!(json["results"][0].get("extra").is_some());
    assert!(json["results"][1].get("extra").is_none());
}

#[tokio::test]
async fn test_degraded_repository_page() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(html(
            r#"<div class="search-title"><a href="/dave/plain">plain</a></div>"#.to_string(),
        ))
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/dave/plain"))
        .respond_with(html("<html><body>No languages</body></html>".to_string()))
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(&mock_server);
    let results = crawler
        .execute(&create_request(&["plain"], SearchKind::Repositories, true))
        .await;

    assert_eq!(results.len(), 1);
    let extra = results[0].extra.as_ref().expect("degraded extra is present");
    assert_eq!(extra.owner, "dave");
    assert!(extra.language_stats.is_empty());
}

#[tokio::test]
async fn test_primary_search_failure_yields_empty() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(&mock_server);
    let results = crawler
        .execute(&create_request(&["rust"], SearchKind::Repositories, true))
        .await;

    assert!(results.is_empty());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_unreachable_site_yields_empty() {
    // Nothing listens on a port we bound and released
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let base_url = Url::parse(&format!("http://127.0.0.1:{}", port)).unwrap();
    let client = GithubClient::with_base_url(&[], base_url).unwrap();
    let crawler = Crawler::from_client(client);

    let results = crawler
        .execute(&create_request(&["rust"], SearchKind::Issues, false))
        .await;
    assert!(results.is_empty());
}

#[tokio::test]
async fn test_issue_search_is_not_enriched() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("type", "issues"))
        .respond_with(html(
            r#"<div class="search-title"><a href="/rust-lang/rust/issues/1">issue</a></div>"#
                .to_string(),
        ))
        .expect(1)
        .mount(&mock_server)
        .await;

    let crawler = create_crawler(&mock_server);
    let results = crawler
        .execute(&create_request(&["panic"], SearchKind::Issues, true))
        .await;

    assert_eq!(results.len(), 1);
    assert!(results[0].extra.is_none());
    mock_server.verify().await;
}

#[tokio::test]
async fn test_unknown_type_rejected_before_any_request() {
    let mock_server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&mock_server)
        .await;

    let input = parse_input(r#"{"keywords": ["rust"], "proxies": [], "type": "wikis"}"#);
    assert!(input.is_err());

    mock_server.verify().await;
    let received = mock_server.received_requests().await.unwrap_or_default();
    assert!(received.is_empty());
}

#[tokio::test]
async fn test_fixed_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/user/repo"))
        .and(header("user-agent", USER_AGENT))
        // wiremock stores comma-separated header values as a list
        .and(headers("accept", ACCEPT_HTML.split(',').collect::<Vec<_>>()))
        .respond_with(html("ok".to_string()))
        .expect(1)
        .mount(&mock_server)
        .await;

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = GithubClient::with_base_url(&[], base_url).unwrap();
    let body = client
        .get_repository(&format!("{}/user/repo", mock_server.uri()))
        .await
        .expect("headers matched");
    assert_eq!(body, "ok");

    mock_server.verify().await;
}

#[tokio::test]
async fn test_non_success_status_is_fetch_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/missing/repo"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;

    let base_url = Url::parse(&mock_server.uri()).unwrap();
    let client = GithubClient::with_base_url(&[], base_url).unwrap();
    let url = format!("{}/missing/repo", mock_server.uri());

    match client.get_repository(&url).await {
        Err(FetchError::Status { status, url: failed }) => {
            assert_eq!(status, 404);
            assert_eq!(failed, url);
        }
        other => panic!("expected status error, got {:?}", other),
    }
}

/// Mounts a search page and one repository page on a server acting as a proxy
async fn mount_proxied_site(proxy: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust"))
        .respond_with(html(
            r#"<div class="search-title"><a href="/a/b">a/b</a></div>"#.to_string(),
        ))
        .mount(proxy)
        .await;

    Mock::given(method("GET"))
        .and(path("/a/b"))
        .respond_with(html(repo_page(&[("Rust", "100.0%")])))
        .mount(proxy)
        .await;
}

#[tokio::test]
async fn test_requests_route_through_bound_proxy() {
    let first = MockServer::start().await;
    let second = MockServer::start().await;
    mount_proxied_site(&first).await;
    mount_proxied_site(&second).await;

    let proxies = vec![first.address().to_string(), second.address().to_string()];
    // The origin never resolves, so every response has to come via a proxy
    let base_url = Url::parse("http://github.invalid").unwrap();
    let client = GithubClient::with_base_url(&proxies, base_url).expect("Failed to build client");

    let bound = client.proxy().expect("a proxy is bound").to_string();
    let (used, unused) = if bound == proxies[0] {
        (&first, &second)
    } else {
        (&second, &first)
    };

    let crawler = Crawler::from_client(client);
    let request = create_request(&["rust"], SearchKind::Repositories, false);
    let results = crawler.execute(&request).await;

    let urls: Vec<&str> = results.iter().map(|r| r.url.as_str()).collect();
    assert_eq!(urls, vec!["http://github.invalid/a/b"]);

    let body = crawler
        .fetcher()
        .get_repository("http://github.invalid/a/b")
        .await
        .expect("second request goes through the same proxy");
    assert!(body.contains("Layout-sidebar"));

    let through_bound = used.received_requests().await.unwrap_or_default();
    assert_eq!(through_bound.len(), 2);
    assert!(through_bound
        .iter()
        .all(|r| r.url.host_str() == Some("github.invalid")));

    let through_other = unused.received_requests().await.unwrap_or_default();
    assert!(through_other.is_empty());
}
