//! HTML parser for search and repository pages
//!
//! This module turns response bodies into structured records:
//! - Result URLs from a search page (`div.search-title` containers)
//! - Owner and language percentages from a repository page
//!
//! Both entry points are total: malformed pages produce the emptiest valid
//! value instead of an error.

use crate::config::SearchKind;
use crate::url::{owner_from_repo_url, resolve_result_url};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use url::Url;

/// A single search hit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    /// Absolute URL of the hit
    pub url: String,

    /// Enrichment data, only present when enrichment ran for this hit
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<EnrichmentInfo>,
}

impl SearchResult {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            extra: None,
        }
    }
}

/// Repository details gathered by enrichment
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct EnrichmentInfo {
    /// Owner derived from the repository URL (empty if it has none)
    pub owner: String,

    /// Language name to percentage of the codebase
    pub language_stats: BTreeMap<String, f64>,
}

impl EnrichmentInfo {
    /// The fallback value for a page whose languages could not be read
    pub fn degraded(owner: String) -> Self {
        Self {
            owner,
            language_stats: BTreeMap::new(),
        }
    }

    /// Returns true if no language data was collected
    pub fn is_degraded(&self) -> bool {
        self.language_stats.is_empty()
    }
}

/// Reasons a repository page could not be read
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ExtractError {
    #[error("Invalid selector: {0}")]
    Selector(&'static str),

    #[error("Language sidebar not found")]
    MissingSidebar,

    #[error("Language entry {index} has {found} span(s), expected at least 2")]
    MissingSpans { index: usize, found: usize },

    #[error("Invalid percentage '{value}' for language '{language}'")]
    InvalidPercentage { language: String, value: String },
}

fn selector(css: &'static str) -> Result<Selector, ExtractError> {
    Selector::parse(css).map_err(|_| ExtractError::Selector(css))
}

/// Extracts search hits from a search results page
///
/// # Extraction Rules
///
/// - Every `div.search-title` container, in document order
/// - The first `<a href>` inside each container
/// - Hrefs starting with `http` are kept verbatim, others are resolved
///   against `base`
/// - Duplicates are kept; containers without a usable link are skipped
///
/// # Arguments
///
/// * `html` - The search page body
/// * `kind` - The kind of search the page came from
/// * `base` - The site origin for relative links
///
/// # Example
///
/// ```
/// use github_crawler::config::SearchKind;
/// use github_crawler::crawler::extract_search_results;
/// use url::Url;
///
/// let html = r#"<div class="search-title"><a href="/rust-lang/rust">rust</a></div>"#;
/// let base = Url::parse("https://github.com").unwrap();
/// let results = extract_search_results(html, SearchKind::Repositories, &base);
/// assert_eq!(results[0].url, "https://github.com/rust-lang/rust");
/// ```
pub fn extract_search_results(html: &str, kind: SearchKind, base: &Url) -> Vec<SearchResult> {
    let (Ok(container_selector), Ok(anchor_selector)) =
        (selector("div.search-title"), selector("a[href]"))
    else {
        return Vec::new();
    };

    let document = Html::parse_document(html);

    let results: Vec<SearchResult> = document
        .select(&container_selector)
        .filter_map(|container| container.select(&anchor_selector).next())
        .filter_map(|anchor| anchor.value().attr("href"))
        .filter_map(|href| resolve_result_url(href, base))
        .map(SearchResult::new)
        .collect();

    tracing::debug!("Parsed {} {} results", results.len(), kind);
    results
}

/// Extracts owner and language breakdown from a repository page
///
/// The owner always comes from `repo_url`. If any part of the language
/// sidebar is missing or malformed the whole breakdown is dropped and an
/// empty map is returned alongside the owner.
///
/// # Example
///
/// ```
/// use github_crawler::crawler::extract_repository_info;
///
/// let info = extract_repository_info("<div>nothing here</div>", "https://github.com/user/repo");
/// assert_eq!(info.owner, "user");
/// assert!(info.language_stats.is_empty());
/// ```
pub fn extract_repository_info(html: &str, repo_url: &str) -> EnrichmentInfo {
    let owner = owner_from_repo_url(repo_url);

    match parse_language_stats(html) {
        Ok(language_stats) => EnrichmentInfo {
            owner,
            language_stats,
        },
        Err(e) => {
            tracing::warn!("Error parsing info for {}: {}", repo_url, e);
            EnrichmentInfo::degraded(owner)
        }
    }
}

/// Reads the language sidebar of a repository page
///
/// Each `li.d-inline` entry inside `div.Layout-sidebar` contributes its last
/// two `span`s as (language, percentage). Percentages look like `"87.5%"`
/// and must fall within 0..=100.
pub fn parse_language_stats(html: &str) -> Result<BTreeMap<String, f64>, ExtractError> {
    let sidebar_selector = selector("div.Layout-sidebar")?;
    let entry_selector = selector("li.d-inline")?;
    let span_selector = selector("span")?;

    let document = Html::parse_document(html);
    let sidebar = document
        .select(&sidebar_selector)
        .next()
        .ok_or(ExtractError::MissingSidebar)?;

    let mut stats = BTreeMap::new();
    for (index, entry) in sidebar.select(&entry_selector).enumerate() {
        let spans: Vec<ElementRef> = entry.select(&span_selector).collect();
        let [.., language, percentage] = spans.as_slice() else {
            return Err(ExtractError::MissingSpans {
                index,
                found: spans.len(),
            });
        };

        let language = element_text(language);
        let value = element_text(percentage);
        let parsed = parse_percentage(&value).ok_or_else(|| ExtractError::InvalidPercentage {
            language: language.clone(),
            value: value.clone(),
        })?;

        stats.insert(language, parsed);
    }

    Ok(stats)
}

/// Collects and trims the text of an element
fn element_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Parses `"12.5%"` into `12.5`
fn parse_percentage(value: &str) -> Option<f64> {
    let number = value.trim().trim_matches('%').trim().parse::<f64>().ok()?;
    (0.0..=100.0).contains(&number).then_some(number)
}
