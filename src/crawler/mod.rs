//! Crawler module for searching and enriching results
//!
//! This module contains the core crawling logic, including:
//! - HTTP fetching through a bound proxy
//! - HTML parsing of search and repository pages
//! - Bounded-concurrency enrichment and order-preserving merge

mod coordinator;
mod fetcher;
mod parser;

pub use coordinator::{fetch_repository_info, Crawler, ENRICHMENT_POOL_WIDTH};
pub use fetcher::{
    build_http_client, fetch_page, proxy_url, select_proxy, Fetch, GithubClient, ACCEPT_HTML,
    FETCH_TIMEOUT, USER_AGENT,
};
pub use parser::{
    extract_repository_info, extract_search_results, parse_language_stats, EnrichmentInfo,
    ExtractError, SearchResult,
};
