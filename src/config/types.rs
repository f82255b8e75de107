use crate::config::validation::validate_proxy_entry;
use crate::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Input document consumed by the crawler, as written by the user
#[derive(Debug, Clone, Deserialize)]
pub struct InputConfig {
    /// Search keywords, joined with spaces into a single query
    pub keywords: Vec<String>,

    /// Proxy pool as "host:port" entries (may be empty)
    pub proxies: Vec<String>,

    /// Raw search type tag; validated into a [`SearchKind`]
    #[serde(rename = "type")]
    pub search_type: String,

    /// Whether repository results should be enriched
    #[serde(rename = "includeExtraInfo", default)]
    pub include_extra_info: bool,
}

/// The kinds of search the site supports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Repositories,
    Issues,
    Discussions,
}

impl SearchKind {
    /// All kinds, in the order they are listed to users
    pub const ALL: [SearchKind; 3] = [Self::Repositories, Self::Issues, Self::Discussions];

    /// The tag sent as the `type` query parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Repositories => "repositories",
            Self::Issues => "issues",
            Self::Discussions => "discussions",
        }
    }
}

impl fmt::Display for SearchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchKind {
    type Err = ConfigError;

    /// Parses a type tag, ignoring ASCII case
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| ConfigError::InvalidSearchType(s.to_string()))
    }
}

/// A validated, immutable search request
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    keywords: Vec<String>,
    kind: SearchKind,
    proxies: Vec<String>,
    enrich: bool,
}

impl SearchRequest {
    /// Creates a request, rejecting an empty keyword list or a bad proxy entry
    pub fn new(
        keywords: Vec<String>,
        kind: SearchKind,
        proxies: Vec<String>,
        enrich: bool,
    ) -> Result<Self, ConfigError> {
        if keywords.is_empty() {
            return Err(ConfigError::Validation(
                "Keywords must be a non-empty list".to_string(),
            ));
        }
        proxies
            .iter()
            .try_for_each(|proxy| validate_proxy_entry(proxy))?;

        Ok(Self {
            keywords,
            kind,
            proxies,
            enrich,
        })
    }

    /// Builds a request from an input document
    ///
    /// Fails on an unrecognized `type` tag, so a bad document is rejected
    /// before any client is built or request sent.
    pub fn from_input(input: &InputConfig) -> Result<Self, ConfigError> {
        let kind = input.search_type.parse::<SearchKind>()?;
        Self::new(
            input.keywords.clone(),
            kind,
            input.proxies.clone(),
            input.include_extra_info,
        )
    }

    /// Returns a copy of this request with enrichment switched on
    pub fn with_enrichment(mut self) -> Self {
        self.enrich = true;
        self
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    pub fn proxies(&self) -> &[String] {
        &self.proxies
    }

    pub fn enrich(&self) -> bool {
        self.enrich
    }

    /// The `q` parameter: keywords joined by single spaces
    pub fn query(&self) -> String {
        self.keywords.join(" ")
    }

    /// True when the enrichment stage should run for this request
    pub fn wants_enrichment(&self) -> bool {
        self.enrich && self.kind == SearchKind::Repositories
    }
}
