//! HTTP fetcher implementation
//!
//! This module handles all outbound requests for the crawler:
//! - Binding one proxy per client, chosen at random from the pool
//! - Building HTTP clients with fixed browser-like headers and timeout
//! - GET requests with optional query parameters
//! - Error classification into [`FetchError`]

use crate::config::{validate_proxy_entry, SearchKind};
use crate::url::GITHUB_BASE_URL;
use crate::{CrawlerError, FetchError, FetchResult};
use async_trait::async_trait;
use rand::seq::SliceRandom;
use rand::Rng;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, Proxy};
use std::time::Duration;
use tracing::Instrument;
use url::Url;

/// User agent sent with every request
pub const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

/// Accept header sent with every request
pub const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8";

/// Per-request timeout, covering connect through body
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

/// A source of page bodies
///
/// The crawler only talks to the network through this trait. `search` and
/// `get_repository` are built on `fetch`, so an implementation only has to
/// provide the single GET.
#[async_trait]
pub trait Fetch: Send + Sync {
    /// Issues one GET and returns the body of a 2xx response
    async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> FetchResult<String>;

    /// Requests the search page for `query`
    async fn search(&self, search_url: &str, query: &str, kind: SearchKind) -> FetchResult<String> {
        self.fetch(search_url, &[("q", query), ("type", kind.as_str())])
            .await
    }

    /// Requests a repository page
    async fn get_repository(&self, repo_url: &str) -> FetchResult<String> {
        self.fetch(repo_url, &[]).await
    }
}

/// Picks one proxy uniformly at random, or `None` for an empty pool
pub fn select_proxy<'a, R>(proxies: &'a [String], rng: &mut R) -> Option<&'a String>
where
    R: Rng + ?Sized,
{
    proxies.choose(rng)
}

/// Turns a pool entry into a proxy URL
///
/// "host:port" entries are proxied over plain HTTP; `http://` and `https://`
/// entries are used as written.
pub fn proxy_url(proxy: &str) -> String {
    if proxy.contains("://") {
        proxy.to_string()
    } else {
        format!("http://{}", proxy)
    }
}

/// Builds an HTTP client with the fixed headers and timeout
///
/// # Arguments
///
/// * `proxy` - Pool entry to route every request through, or `None` for
///   direct connections (proxy environment variables are ignored as well)
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(CrawlerError)` - The proxy entry was invalid or the client failed to build
pub fn build_http_client(proxy: Option<&str>) -> Result<Client, CrawlerError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static(ACCEPT_HTML));

    let builder = Client::builder()
        .user_agent(USER_AGENT)
        .default_headers(headers)
        .timeout(FETCH_TIMEOUT)
        .gzip(true)
        .brotli(true);

    let builder = match proxy {
        Some(proxy) => {
            let proxy_config =
                Proxy::all(proxy_url(proxy)).map_err(|source| CrawlerError::Proxy {
                    proxy: proxy.to_string(),
                    source,
                })?;
            builder.proxy(proxy_config)
        }
        None => builder.no_proxy(),
    };

    Ok(builder.build()?)
}

/// Fetches a URL once, with no retries
///
/// Logs the response status (or the error) exactly once per call.
///
/// # Errors
///
/// | Condition | Error |
/// |-----------|-------|
/// | Timeout | `FetchError::Timeout` |
/// | Connection refused / DNS / TLS | `FetchError::Connect` |
/// | Non-2xx status | `FetchError::Status` |
/// | Body could not be read | `FetchError::Body` |
/// | Anything else | `FetchError::Request` |
pub async fn fetch_page(client: &Client, url: &str, params: &[(&str, &str)]) -> FetchResult<String> {
    let mut request = client.get(url);
    if !params.is_empty() {
        request = request.query(params);
    }

    let response = match request.send().await {
        Ok(response) => response,
        Err(e) => {
            let error = classify_error(url, e);
            tracing::error!("Error during request: {}", error);
            return Err(error);
        }
    };

    let status = response.status();
    tracing::info!("Response status: {} ({})", status.as_u16(), url);

    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    response.text().await.map_err(|source| FetchError::Body {
        url: url.to_string(),
        source,
    })
}

/// Classifies a transport error
fn classify_error(url: &str, error: reqwest::Error) -> FetchError {
    let url = url.to_string();
    if error.is_timeout() {
        FetchError::Timeout { url }
    } else if error.is_connect() {
        FetchError::Connect { url, source: error }
    } else {
        FetchError::Request { url, source: error }
    }
}

/// HTTP client for the code-hosting site
///
/// One proxy is bound when the client is built and used for every request
/// it makes; the underlying connection pool is shared by all callers.
#[derive(Clone)]
pub struct GithubClient {
    client: Client,
    base_url: Url,
    proxy: Option<String>,
    span: tracing::Span,
}

impl GithubClient {
    /// Creates a client for github.com, binding a random proxy from `proxies`
    pub fn new(proxies: &[String]) -> Result<Self, CrawlerError> {
        Self::with_base_url(proxies, Url::parse(GITHUB_BASE_URL)?)
    }

    /// Creates a client for another origin, binding a random proxy from `proxies`
    ///
    /// The whole pool is checked first, so a bad entry fails every time
    /// instead of only when it is drawn.
    pub fn with_base_url(proxies: &[String], base_url: Url) -> Result<Self, CrawlerError> {
        for proxy in proxies {
            validate_proxy_entry(proxy)?;
        }

        let proxy = select_proxy(proxies, &mut rand::thread_rng()).cloned();
        let client = build_http_client(proxy.as_deref())?;

        let span = tracing::info_span!(
            "github_client",
            proxy = proxy.as_deref().unwrap_or("direct")
        );
        span.in_scope(|| match &proxy {
            Some(p) => tracing::info!("Selected proxy: {}", p),
            None => tracing::info!("No proxies configured, using direct connections"),
        });

        Ok(Self {
            client,
            base_url,
            proxy,
            span,
        })
    }

    /// The proxy bound at construction, if any
    pub fn proxy(&self) -> Option<&str> {
        self.proxy.as_deref()
    }

    /// The origin searches are sent to
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }
}

#[async_trait]
impl Fetch for GithubClient {
    async fn fetch(&self, url: &str, params: &[(&str, &str)]) -> FetchResult<String> {
        fetch_page(&self.client, url, params)
            .instrument(self.span.clone())
            .await
    }
}
