//! Top-K enhancement over ranked results.
//!
//! Splits the ranked list at `top_k`, routes the head through an
//! [`Enricher`] and re-attaches the untouched tail. Enrichment failures are
//! recorded on the affected items; the stage itself never fails and never
//! drops an item.

pub mod extract;

pub use extract::{Enricher, Extractor, HttpTermExtractor, MockTermExtractor};

use futures::stream::{self, StreamExt};

use crate::config::EnhancementConfig;
use crate::error::SearchError;
use crate::types::{EnhancedItem, OutcomeItem, ResultItem, SearchOutcome};

/// Applies an [`Enricher`] to the top-ranked slice of a result list.
#[derive(Debug)]
pub struct EnhancementStage<E> {
    enricher: E,
    config: EnhancementConfig,
}

impl<E: Enricher> EnhancementStage<E> {
    /// Create a stage over `enricher`.
    pub fn new(enricher: E, config: EnhancementConfig) -> Self {
        Self { enricher, config }
    }

    /// The wrapped enricher.
    pub fn enricher(&self) -> &E {
        &self.enricher
    }

    /// Returns `true` unless disabled by configuration.
    pub fn is_enabled(&self) -> bool {
        self.config.enabled
    }

    /// Default head size when the caller does not choose one.
    pub fn default_top_k(&self) -> usize {
        self.config.default_top_k
    }

    /// Enrich the first `top_k` items of `ranked`.
    ///
    /// - Disabled stage or `top_k == 0`: identity pass
    /// - `top_k` larger than the list: the whole list is the head
    /// - Batch-capable enricher: one call for the head; on failure every
    ///   head item passes through with `enhancement_error` set
    /// - Item-oriented enricher: one call per item, at most
    ///   `config.concurrency` in flight, output order preserved
    ///
    /// The output always has `ranked.len()` entries in rank order.
    pub async fn enhance(
        &self,
        ranked: Vec<ResultItem>,
        top_k: usize,
        instruction: Option<&str>,
    ) -> SearchOutcome {
        if !self.config.enabled || top_k == 0 || ranked.is_empty() {
            return ranked.into_iter().map(OutcomeItem::Plain).collect();
        }

        let mut head = ranked;
        let tail = head.split_off(top_k.min(head.len()));
        tracing::debug!(
            enricher = self.enricher.name(),
            head = head.len(),
            tail = tail.len(),
            "enhancing top results"
        );

        let enhanced = if self.enricher.supports_batch() {
            self.enrich_batch(head, instruction).await
        } else {
            self.enrich_each(head, instruction).await
        };

        enhanced
            .into_iter()
            .map(OutcomeItem::Enhanced)
            .chain(tail.into_iter().map(OutcomeItem::Plain))
            .collect()
    }

    async fn enrich_batch(
        &self,
        head: Vec<ResultItem>,
        instruction: Option<&str>,
    ) -> Vec<EnhancedItem> {
        let err = match self.enricher.enrich_batch(&head, instruction).await {
            Ok(enriched) if enriched.len() == head.len() => return enriched,
            Ok(enriched) => SearchError::Enhancement(format!(
                "enricher returned {} items for a batch of {}",
                enriched.len(),
                head.len()
            )),
            Err(err) => err,
        };
        tracing::warn!(error = %err, count = head.len(), "batch enhancement failed, passing items through");
        head.into_iter()
            .map(|item| EnhancedItem::failed(item, &err))
            .collect()
    }

    async fn enrich_each(
        &self,
        head: Vec<ResultItem>,
        instruction: Option<&str>,
    ) -> Vec<EnhancedItem> {
        stream::iter(head)
            .map(|item| async move {
                match self.enricher.extract_term(&item.content, instruction).await {
                    Ok(term) => EnhancedItem::with_search_term(item, term),
                    Err(err) => {
                        tracing::warn!(item_id = %item.id, error = %err, "item enhancement failed");
                        EnhancedItem::failed(item, err)
                    }
                }
            })
            .buffered(self.config.concurrency.max(1))
            .collect()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::types::EngagementMetrics;

    fn make_item(id: &str) -> ResultItem {
        ResultItem {
            id: id.to_string(),
            content: format!("content-{id}"),
            engagement_metrics: EngagementMetrics::default(),
            score: Some(1.0),
            source_url: None,
        }
    }

    fn items(n: usize) -> Vec<ResultItem> {
        (0..n).map(|i| make_item(&format!("i{i}"))).collect()
    }

    fn config() -> EnhancementConfig {
        EnhancementConfig::default()
    }

    fn ids(outcome: &SearchOutcome) -> Vec<String> {
        outcome.iter().map(|o| o.item().id.clone()).collect()
    }

    /// Echoes content as the term; fails for content listed in `fail_on`.
    struct EchoEnricher {
        fail_on: Vec<String>,
        calls: AtomicUsize,
    }

    impl EchoEnricher {
        fn new(fail_on: &[&str]) -> Self {
            Self {
                fail_on: fail_on.iter().map(|s| s.to_string()).collect(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl Enricher for EchoEnricher {
        async fn extract_term(
            &self,
            content: &str,
            instruction: Option<&str>,
        ) -> Result<String, SearchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail_on.iter().any(|f| f == content) {
                return Err(SearchError::Enhancement(format!("cannot extract from {content}")));
            }
            Ok(match instruction {
                Some(i) => format!("{i}:{content}"),
                None => content.to_owned(),
            })
        }

        fn name(&self) -> &'static str {
            "echo"
        }
    }

    /// Batch enricher returning items reversed, or failing.
    struct BatchEnricher {
        fail: bool,
        drop_one: bool,
    }

    impl Enricher for BatchEnricher {
        fn supports_batch(&self) -> bool {
            true
        }

        async fn enrich_batch(
            &self,
            items: &[ResultItem],
            _instruction: Option<&str>,
        ) -> Result<Vec<EnhancedItem>, SearchError> {
            if self.fail {
                return Err(SearchError::Enhancement("batch service down".into()));
            }
            let mut out: Vec<EnhancedItem> = items
                .iter()
                .rev()
                .map(|i| EnhancedItem::with_enriched_content(i.clone(), i.content.to_uppercase()))
                .collect();
            if self.drop_one {
                out.pop();
            }
            Ok(out)
        }

        async fn extract_term(
            &self,
            _content: &str,
            _instruction: Option<&str>,
        ) -> Result<String, SearchError> {
            Err(SearchError::Enhancement("per-item path must not be used".into()))
        }

        fn name(&self) -> &'static str {
            "batch"
        }
    }

    #[tokio::test]
    async fn top_k_zero_is_identity() {
        let stage = EnhancementStage::new(EchoEnricher::new(&[]), config());
        let input = items(4);
        let outcome = stage.enhance(input.clone(), 0, None).await;
        assert_eq!(outcome, input.into_iter().map(OutcomeItem::Plain).collect::<Vec<_>>());
        assert_eq!(stage.enricher().calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn disabled_stage_is_identity() {
        let stage = EnhancementStage::new(
            EchoEnricher::new(&[]),
            EnhancementConfig {
                enabled: false,
                ..config()
            },
        );
        let outcome = stage.enhance(items(3), 2, None).await;
        assert!(outcome.iter().all(|o| matches!(o, OutcomeItem::Plain(_))));
        assert_eq!(ids(&outcome), vec!["i0", "i1", "i2"]);
    }

    #[tokio::test]
    async fn length_preserved_for_every_top_k() {
        let stage = EnhancementStage::new(EchoEnricher::new(&[]), config());
        for n in 0..5 {
            for k in 0..=n + 2 {
                let outcome = stage.enhance(items(n), k, None).await;
                assert_eq!(outcome.len(), n, "n={n} k={k}");
                let enhanced = outcome
                    .iter()
                    .filter(|o| matches!(o, OutcomeItem::Enhanced(_)))
                    .count();
                assert_eq!(enhanced, k.min(n));
            }
        }
    }

    #[tokio::test]
    async fn head_enhanced_tail_untouched_in_rank_order() {
        let stage = EnhancementStage::new(EchoEnricher::new(&[]), config());
        let outcome = stage.enhance(items(5), 2, Some("focus")).await;
        assert_eq!(ids(&outcome), vec!["i0", "i1", "i2", "i3", "i4"]);
        match &outcome[0] {
            OutcomeItem::Enhanced(e) => assert_eq!(e.search_term.as_deref(), Some("focus:content-i0")),
            other => panic!("expected enhanced item, got {other:?}"),
        }
        assert!(matches!(outcome[2], OutcomeItem::Plain(_)));
    }

    #[tokio::test]
    async fn per_item_failure_does_not_abort_the_rest() {
        let stage = EnhancementStage::new(EchoEnricher::new(&["content-i1"]), config());
        let outcome = stage.enhance(items(4), 3, None).await;
        assert_eq!(outcome.len(), 4);
        assert_eq!(stage.enricher().calls.load(Ordering::SeqCst), 3);

        let enhanced: Vec<&EnhancedItem> = outcome
            .iter()
            .filter_map(|o| match o {
                OutcomeItem::Enhanced(e) => Some(e),
                OutcomeItem::Plain(_) => None,
            })
            .collect();
        assert!(!enhanced[0].is_error());
        assert!(enhanced[1].is_error());
        assert_eq!(enhanced[1].original, make_item("i1"));
        assert!(!enhanced[2].is_error());
    }

    #[tokio::test]
    async fn bounded_concurrency_preserves_order() {
        let stage = EnhancementStage::new(
            EchoEnricher::new(&[]),
            EnhancementConfig {
                concurrency: 4,
                ..config()
            },
        );
        let outcome = stage.enhance(items(8), 8, None).await;
        assert_eq!(ids(&outcome), (0..8).map(|i| format!("i{i}")).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn batch_success_replaces_head_in_returned_order() {
        let stage = EnhancementStage::new(
            BatchEnricher {
                fail: false,
                drop_one: false,
            },
            config(),
        );
        let outcome = stage.enhance(items(4), 2, None).await;
        assert_eq!(ids(&outcome), vec!["i1", "i0", "i2", "i3"]);
        match &outcome[0] {
            OutcomeItem::Enhanced(e) => assert_eq!(e.enriched_content.as_deref(), Some("CONTENT-I1")),
            other => panic!("expected enhanced item, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn batch_failure_annotates_every_head_item() {
        let stage = EnhancementStage::new(
            BatchEnricher {
                fail: true,
                drop_one: false,
            },
            config(),
        );
        let outcome = stage.enhance(items(4), 3, None).await;
        assert_eq!(ids(&outcome), vec!["i0", "i1", "i2", "i3"]);
        for entry in &outcome[..3] {
            match entry {
                OutcomeItem::Enhanced(e) => {
                    assert!(e.enhancement_error.as_deref().unwrap_or("").contains("batch service down"));
                }
                other => panic!("expected annotated item, got {other:?}"),
            }
        }
        assert!(matches!(outcome[3], OutcomeItem::Plain(_)));
    }

    #[tokio::test]
    async fn short_batch_is_treated_as_failure() {
        let stage = EnhancementStage::new(
            BatchEnricher {
                fail: false,
                drop_one: true,
            },
            config(),
        );
        let outcome = stage.enhance(items(3), 3, None).await;
        assert_eq!(ids(&outcome), vec!["i0", "i1", "i2"]);
        assert!(outcome
            .iter()
            .all(|o| matches!(o, OutcomeItem::Enhanced(e) if e.is_error())));
    }
}
