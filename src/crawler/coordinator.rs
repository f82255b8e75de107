//! Crawler coordinator - search orchestration logic
//!
//! This module runs one search from start to finish:
//! - Sending the primary search request
//! - Extracting result URLs from the search page
//! - Enriching repository results through a bounded worker pool
//! - Merging enrichment back onto results in their original order
//!
//! Nothing here returns an error to the caller. A failed search yields an
//! empty list; a failed enrichment task leaves its result without `extra`.

use crate::config::SearchRequest;
use crate::crawler::fetcher::{Fetch, GithubClient};
use crate::crawler::parser::{
    extract_repository_info, extract_search_results, EnrichmentInfo, SearchResult,
};
use crate::state::RunState;
use crate::CrawlerError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;
use url::Url;

/// Number of enrichment fetches allowed in flight at once
pub const ENRICHMENT_POOL_WIDTH: usize = 5;

/// Outcome of one enrichment task, tagged with its originating slot
type TaskOutcome = (usize, String, Result<EnrichmentInfo, CrawlerError>);

/// Main search orchestrator
///
/// Holds one fetcher (and therefore one proxy binding) for its whole life.
/// Each [`Crawler::execute`] call builds its own worker pool and drains it
/// before returning.
pub struct Crawler<F = GithubClient> {
    fetcher: Arc<F>,
    base_url: Url,
    pool_width: usize,
    span: tracing::Span,
}

impl Crawler<GithubClient> {
    /// Creates a crawler for github.com using the request's proxy pool
    ///
    /// # Returns
    ///
    /// * `Ok(Crawler)` - Client built with a proxy bound (or direct)
    /// * `Err(CrawlerError)` - A proxy entry was invalid or the client failed to build
    pub fn new(request: &SearchRequest) -> Result<Self, CrawlerError> {
        let client = GithubClient::new(request.proxies())?;
        Ok(Self::from_client(client))
    }

    /// Creates a crawler around an existing client
    pub fn from_client(client: GithubClient) -> Self {
        let base_url = client.base_url().clone();
        Self::with_fetcher(client, base_url)
    }
}

impl<F: Fetch + 'static> Crawler<F> {
    /// Creates a crawler around any fetcher
    ///
    /// `base_url` is the origin the search endpoint lives on and that
    /// relative result links are resolved against.
    pub fn with_fetcher(fetcher: F, base_url: Url) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            base_url,
            pool_width: ENRICHMENT_POOL_WIDTH,
            span: tracing::info_span!("crawler"),
        }
    }

    /// Replaces the span runs are logged under
    pub fn with_span(mut self, span: tracing::Span) -> Self {
        self.span = span;
        self
    }

    /// Overrides the enrichment pool width (at least 1)
    pub fn with_pool_width(mut self, width: usize) -> Self {
        self.pool_width = width.max(1);
        self
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    pub fn pool_width(&self) -> usize {
        self.pool_width
    }

    /// Runs a search and returns its results in page order
    ///
    /// # Flow
    ///
    /// 1. GET `{base}/search?q=<keywords joined by spaces>&type=<kind>`
    /// 2. On failure → log, return an empty list
    /// 3. Extract result URLs
    /// 4. Unless this is an enriched repository search → return them
    /// 5. Enrich every result (pool width 5) and return the merged list
    pub async fn execute(&self, request: &SearchRequest) -> Vec<SearchResult> {
        self.run(request).instrument(self.span.clone()).await
    }

    async fn run(&self, request: &SearchRequest) -> Vec<SearchResult> {
        let mut state = RunState::Idle;
        advance(&mut state, RunState::Searching);

        tracing::info!(
            "Searching for {} with keywords: {:?}",
            request.kind(),
            request.keywords()
        );

        let search_url = match self.base_url.join("/search") {
            Ok(url) => url,
            Err(e) => {
                tracing::error!("Invalid search endpoint for {}: {}", self.base_url, e);
                advance(&mut state, RunState::Done);
                return Vec::new();
            }
        };

        let body = match self
            .fetcher
            .search(search_url.as_str(), &request.query(), request.kind())
            .await
        {
            Ok(body) => body,
            Err(e) => {
                tracing::error!("Error during search: {}", e);
                advance(&mut state, RunState::Done);
                return Vec::new();
            }
        };

        let results = extract_search_results(&body, request.kind(), &self.base_url);
        tracing::info!("Found {} results", results.len());

        if !request.wants_enrichment() {
            advance(&mut state, RunState::Done);
            return results;
        }

        advance(&mut state, RunState::Enriching);
        let results = self.enrich(results).await;
        advance(&mut state, RunState::Done);

        results
    }

    /// Fetches and parses every result's page, at most `pool_width` at a time
    ///
    /// Each task writes into the slot of the result it came from, so
    /// completion order never changes the output order.
    async fn enrich(&self, results: Vec<SearchResult>) -> Vec<SearchResult> {
        let pool = Arc::new(Semaphore::new(self.pool_width));
        let mut tasks = JoinSet::new();

        for (index, result) in results.iter().enumerate() {
            let task = run_task(
                Arc::clone(&self.fetcher),
                Arc::clone(&pool),
                index,
                result.url.clone(),
            );
            tasks.spawn(task.instrument(self.span.clone()));
        }

        let mut slots: Vec<Option<EnrichmentInfo>> = vec![None; results.len()];
        let mut failed = 0usize;
        let mut degraded = 0usize;

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((index, _, Ok(info))) => {
                    if info.is_degraded() {
                        degraded += 1;
                    }
                    if let Some(slot) = slots.get_mut(index) {
                        *slot = Some(info);
                    }
                }
                Ok((_, url, Err(e))) => {
                    failed += 1;
                    tracing::error!("Error processing {}: {}", url, e);
                }
                Err(e) => {
                    failed += 1;
                    tracing::error!("Enrichment task did not complete: {}", e);
                }
            }
        }

        tracing::info!(
            "Enrichment finished: {} succeeded ({} without language data), {} failed",
            results.len() - failed,
            degraded,
            failed
        );

        results
            .into_iter()
            .zip(slots)
            .map(|(mut result, extra)| {
                result.extra = extra;
                result
            })
            .collect()
    }
}

/// One enrichment task: wait for a pool slot, then fetch and parse
async fn run_task<F: Fetch + ?Sized>(
    fetcher: Arc<F>,
    pool: Arc<Semaphore>,
    index: usize,
    url: String,
) -> TaskOutcome {
    let Ok(_permit) = pool.acquire_owned().await else {
        let error = CrawlerError::PoolClosed { url: url.clone() };
        return (index, url, Err(error));
    };

    let outcome = AssertUnwindSafe(fetch_repository_info(fetcher.as_ref(), &url))
        .catch_unwind()
        .await;

    let outcome = match outcome {
        Ok(result) => result,
        Err(_) => Err(CrawlerError::TaskPanicked { url: url.clone() }),
    };

    (index, url, outcome)
}

/// Fetches a repository page and extracts its owner and languages
pub async fn fetch_repository_info<F: Fetch + ?Sized>(
    fetcher: &F,
    repo_url: &str,
) -> Result<EnrichmentInfo, CrawlerError> {
    tracing::info!("Getting extra info for {}", repo_url);
    let body = fetcher.get_repository(repo_url).await?;
    Ok(extract_repository_info(&body, repo_url))
}

/// Moves the run to `next`, logging the step
fn advance(state: &mut RunState, next: RunState) {
    let from = *state;
    match state.transition(next) {
        Ok(()) => tracing::debug!("Run state: {} -> {}", from, next),
        Err(e) => tracing::warn!("Ignoring invalid run state transition: {}", e),
    }
}
