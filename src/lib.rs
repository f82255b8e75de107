//! GitHub Crawler: keyword search with optional repository enrichment
//!
//! This crate runs a single search against GitHub's HTML search page and,
//! for repository searches, can fetch every hit's page to collect the owner
//! and language breakdown. All requests may be routed through a proxy picked
//! at random from a pool.

pub mod config;
pub mod crawler;
pub mod output;
pub mod state;
pub mod url;

use thiserror::Error;

/// Main error type for crawler operations
#[derive(Debug, Error)]
pub enum CrawlerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Invalid proxy '{proxy}': {source}")]
    Proxy {
        proxy: String,
        source: reqwest::Error,
    },

    #[error("HTTP client error: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("URL parse error: {0}")]
    UrlParse(#[from] ::url::ParseError),

    #[error("Enrichment task for {url} panicked")]
    TaskPanicked { url: String },

    #[error("Enrichment pool closed before {url} could run")]
    PoolClosed { url: String },

    #[error("Failed to serialize output: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read input file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Missing required field(s): {0}")]
    MissingFields(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid search type: {0}. Must be one of: repositories, issues, discussions")]
    InvalidSearchType(String),
}

/// Transport failures for a single outbound request
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Request timeout for {url}")]
    Timeout { url: String },

    #[error("Connection failed for {url}: {source}")]
    Connect { url: String, source: reqwest::Error },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },

    #[error("Request failed for {url}: {source}")]
    Request { url: String, source: reqwest::Error },

    #[error("Failed to read body of {url}: {source}")]
    Body { url: String, source: reqwest::Error },
}

/// Result type alias for crawler operations
pub type Result<T> = std::result::Result<T, CrawlerError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;

/// Result type alias for single fetches
pub type FetchResult<T> = std::result::Result<T, FetchError>;

// Re-export commonly used types
pub use config::{InputConfig, SearchKind, SearchRequest};
pub use crawler::{Crawler, EnrichmentInfo, Fetch, GithubClient, SearchResult};
pub use state::RunState;
