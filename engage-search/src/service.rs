//! Search service: the single entry point composing the pipeline.
//!
//! ```text
//! query ─▶ PollingOrchestrator ─▶ rank ─▶ EnhancementStage ─▶ outcome
//! ```

use crate::client::JobClient;
use crate::clients::Upstream;
use crate::config::{EnhancementConfig, PollConfig, SearchServiceConfig};
use crate::enhance::{Enricher, EnhancementStage, Extractor};
use crate::error::SearchError;
use crate::orchestrator::{scoring, PollingOrchestrator};
use crate::types::{ResultItem, SearchOutcome, SearchQuery};

/// Search pipeline over a job client and an enricher.
///
/// Holds no per-request state; one instance serves concurrent requests.
#[derive(Debug)]
pub struct SearchService<C = Upstream, E = Extractor> {
    orchestrator: PollingOrchestrator<C>,
    stage: EnhancementStage<E>,
}

impl SearchService {
    /// Build the service from configuration, selecting live or mock
    /// collaborators from the upstream credential.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid or
    /// the HTTP clients cannot be built.
    pub fn new(config: SearchServiceConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let upstream = Upstream::from_config(&config.upstream)?;
        let extractor = Extractor::from_config(&config.upstream)?;
        Ok(Self::with_parts(
            upstream,
            extractor,
            config.poll,
            config.enhancement,
        ))
    }

    /// Returns `true` when serving synthetic data.
    pub fn is_mock(&self) -> bool {
        self.orchestrator.client().is_mock()
    }
}

impl<C: JobClient, E: Enricher> SearchService<C, E> {
    /// Assemble a service from explicit collaborators.
    pub fn with_parts(
        client: C,
        enricher: E,
        poll: PollConfig,
        enhancement: EnhancementConfig,
    ) -> Self {
        Self {
            orchestrator: PollingOrchestrator::new(client, poll),
            stage: EnhancementStage::new(enricher, enhancement),
        }
    }

    /// Run a job for `query` and return its items ranked by engagement.
    ///
    /// # Errors
    ///
    /// Propagates orchestration failures; see [`PollingOrchestrator::run`].
    pub async fn search(&self, query: &SearchQuery) -> Result<Vec<ResultItem>, SearchError> {
        let items = self.orchestrator.run(query).await?;
        Ok(scoring::rank(items))
    }

    /// Search, rank, then enrich the top `top_k` items.
    ///
    /// `None` uses the configured default head size. Enrichment failures
    /// are recorded per item and never fail the call.
    ///
    /// # Errors
    ///
    /// Same as [`search`](Self::search).
    pub async fn search_and_enhance(
        &self,
        query: &SearchQuery,
        top_k: Option<usize>,
        instruction: Option<&str>,
    ) -> Result<SearchOutcome, SearchError> {
        let ranked = self.search(query).await?;
        let top_k = top_k.unwrap_or_else(|| self.stage.default_top_k());
        Ok(self.stage.enhance(ranked, top_k, instruction).await)
    }

    /// Score and order caller-supplied items without any upstream call.
    pub fn rank(&self, items: Vec<ResultItem>) -> Vec<ResultItem> {
        scoring::rank(items)
    }

    /// Extract a search term from free text through the enricher.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] for blank content, otherwise
    /// whatever the enricher reports.
    pub async fn extract_term(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> Result<String, SearchError> {
        if content.trim().is_empty() {
            return Err(SearchError::InvalidQuery("content must not be empty".into()));
        }
        self.stage.enricher().extract_term(content, instruction).await
    }

    /// Whether the enrichment stage is enabled.
    pub fn enhancement_enabled(&self) -> bool {
        self.stage.is_enabled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::MockJobClient;
    use crate::config::UpstreamConfig;
    use crate::enhance::MockTermExtractor;
    use crate::types::OutcomeItem;
    use std::time::Duration;

    fn fast_poll() -> PollConfig {
        PollConfig {
            base_interval: Duration::from_millis(10),
            max_interval: Duration::from_millis(20),
            timeout: Duration::from_secs(5),
        }
    }

    fn mock_service() -> SearchService<MockJobClient, MockTermExtractor> {
        SearchService::with_parts(
            MockJobClient::new(2),
            MockTermExtractor,
            fast_poll(),
            EnhancementConfig::default(),
        )
    }

    #[test]
    fn new_without_key_selects_mock_mode() {
        let service = SearchService::new(SearchServiceConfig::default()).expect("service");
        assert!(service.is_mock());
        assert!(service.enhancement_enabled());
    }

    #[test]
    fn new_with_key_selects_live_mode() {
        let service = SearchService::new(SearchServiceConfig {
            upstream: UpstreamConfig {
                api_key: Some("secret".into()),
                ..Default::default()
            },
            ..Default::default()
        })
        .expect("service");
        assert!(!service.is_mock());
    }

    #[test]
    fn new_rejects_invalid_config() {
        let err = SearchService::new(SearchServiceConfig {
            enhancement: EnhancementConfig {
                concurrency: 0,
                ..Default::default()
            },
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, SearchError::Config(_)));
    }

    #[tokio::test(start_paused = true)]
    async fn search_returns_ranked_items() {
        let service = mock_service();
        let query = SearchQuery::new("rust", Some(6)).expect("query");
        let items = service.search(&query).await.expect("items");
        assert_eq!(items.len(), 6);
        assert!(items.iter().all(|i| i.score.is_some()));
        assert!(items
            .windows(2)
            .all(|w| w[0].score.unwrap_or_default() >= w[1].score.unwrap_or_default()));
    }

    #[tokio::test(start_paused = true)]
    async fn search_and_enhance_uses_default_top_k() {
        let service = mock_service();
        let query = SearchQuery::new("rust", Some(5)).expect("query");
        let outcome = service
            .search_and_enhance(&query, None, None)
            .await
            .expect("outcome");
        assert_eq!(outcome.len(), 5);
        let enhanced = outcome
            .iter()
            .filter(|o| matches!(o, OutcomeItem::Enhanced(_)))
            .count();
        assert_eq!(enhanced, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn search_and_enhance_zero_is_plain_ranking() {
        let service = mock_service();
        let query = SearchQuery::new("rust", Some(4)).expect("query");
        let outcome = service
            .search_and_enhance(&query, Some(0), None)
            .await
            .expect("outcome");
        assert!(outcome.iter().all(|o| matches!(o, OutcomeItem::Plain(_))));
    }

    #[tokio::test]
    async fn extract_term_rejects_blank_content() {
        let err = mock_service().extract_term("   ", None).await.unwrap_err();
        assert!(matches!(err, SearchError::InvalidQuery(_)));

        let term = mock_service()
            .extract_term("#Solana pumps", None)
            .await
            .expect("term");
        assert_eq!(term, "solana");
    }

    #[test]
    fn rank_orders_supplied_items() {
        let items = crate::clients::mock_items("x", 10);
        let ranked = mock_service().rank(items);
        assert_eq!(ranked.len(), 10);
        assert!(ranked
            .windows(2)
            .all(|w| w[0].score.unwrap_or_default() >= w[1].score.unwrap_or_default()));
    }
}
