//! # engage-search
//!
//! Asynchronous job-based social search with engagement ranking.
//!
//! A query is submitted to an upstream job API, polled with exponential
//! backoff under a hard deadline, and the retrieved items are ranked by a
//! weighted engagement score. An optional stage enriches the top-ranked
//! items with an extracted search term.
//!
//! ## Design
//!
//! - [`JobClient`] abstracts the upstream (live HTTP or local mock)
//! - [`PollingOrchestrator`] owns the submit → poll → retrieve lifecycle
//! - [`orchestrator::scoring`] is a pure, deterministic ranking function
//! - [`EnhancementStage`] enriches the head of the list; failures are
//!   recorded per item and never fail the request
//! - [`SearchService`] composes the pipeline and is shared across requests
//!
//! ## Security
//!
//! - The API key is sent only in the `Authorization` header and is
//!   redacted from `Debug` output
//! - Query text is logged only at debug level

pub mod client;
pub mod clients;
pub mod config;
pub mod enhance;
pub mod error;
pub mod http;
pub mod orchestrator;
pub mod service;
pub mod types;

pub use client::JobClient;
pub use config::{EnhancementConfig, PollConfig, SearchServiceConfig, UpstreamConfig};
pub use enhance::{Enricher, EnhancementStage};
pub use error::{Result, SearchError};
pub use orchestrator::PollingOrchestrator;
pub use service::SearchService;
pub use types::{
    EngagementMetrics, EnhancedItem, JobHandle, JobStatus, OutcomeItem, ResultItem, SearchOutcome,
    SearchQuery,
};

/// Run a search job and return its items ranked by engagement.
///
/// Builds a one-off [`SearchService`] from `config`. Long-lived callers
/// should construct the service once and reuse it.
///
/// # Errors
///
/// Returns [`SearchError::InvalidQuery`] for a blank query or an
/// out-of-range `max_results`, [`SearchError::Config`] for invalid
/// settings, and any orchestration failure otherwise.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> engage_search::Result<()> {
/// let config = engage_search::SearchServiceConfig::default();
/// let items = engage_search::search("rust async", Some(20), &config).await?;
/// for item in &items {
///     println!("{:>8.1} {}", item.score.unwrap_or_default(), item.content);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    query: &str,
    max_results: Option<u32>,
    config: &SearchServiceConfig,
) -> Result<Vec<ResultItem>> {
    let query = SearchQuery::new(query, max_results)?;
    SearchService::new(config.clone())?.search(&query).await
}

/// Search, rank, and enrich the top `top_k` items.
///
/// `top_k` of `None` uses [`EnhancementConfig::default_top_k`].
///
/// # Errors
///
/// Same as [`search`]. Enrichment failures never surface here.
pub async fn search_and_enhance(
    query: &str,
    max_results: Option<u32>,
    top_k: Option<usize>,
    config: &SearchServiceConfig,
) -> Result<SearchOutcome> {
    let query = SearchQuery::new(query, max_results)?;
    SearchService::new(config.clone())?
        .search_and_enhance(&query, top_k, None)
        .await
}
