//! Enrichment collaborators.
//!
//! The upstream exposes an item-oriented term-extraction endpoint, so the
//! live [`HttpTermExtractor`] enriches one item per call. Batch-capable
//! collaborators override [`Enricher::enrich_batch`] and report
//! [`Enricher::supports_batch`].

use serde::{Deserialize, Serialize};

use crate::config::UpstreamConfig;
use crate::error::SearchError;
use crate::http::{build_client, describe_status, endpoint, transport_error};
use crate::types::{EnhancedItem, ResultItem};

const EXTRACTION_PATH: &str = "v1/search/extraction";

/// Term returned when nothing usable can be derived from the content.
const FALLBACK_TERM: &str = "artificial intelligence";

/// Maximum number of words in a derived mock term.
const MOCK_TERM_WORDS: usize = 4;

/// An external enrichment service.
pub trait Enricher: Send + Sync {
    /// Whether [`enrich_batch`](Self::enrich_batch) is implemented.
    fn supports_batch(&self) -> bool {
        false
    }

    /// Enrich several items in one call, returning them in output order.
    ///
    /// # Errors
    ///
    /// The default implementation always fails with
    /// [`SearchError::Enhancement`].
    fn enrich_batch(
        &self,
        _items: &[ResultItem],
        _instruction: Option<&str>,
    ) -> impl std::future::Future<Output = Result<Vec<EnhancedItem>, SearchError>> + Send {
        async { Err(SearchError::Enhancement("batch enrichment not supported".into())) }
    }

    /// Extract a search term from one item's content.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Enhancement`] or [`SearchError::Transport`]
    /// when the collaborator cannot produce a term.
    fn extract_term(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> impl std::future::Future<Output = Result<String, SearchError>> + Send;

    /// Short collaborator name for logs.
    fn name(&self) -> &'static str;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionRequest<'a> {
    user_input: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    instruction: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ExtractionResponse {
    #[serde(default)]
    search_term: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

/// Live term extractor backed by the upstream extraction endpoint.
pub struct HttpTermExtractor {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for HttpTermExtractor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTermExtractor")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl HttpTermExtractor {
    /// Create an extractor from upstream settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the settings are invalid.
    pub fn new(config: &UpstreamConfig) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url.clone(),
        })
    }
}

impl Enricher for HttpTermExtractor {
    async fn extract_term(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> Result<String, SearchError> {
        let url = endpoint(&self.base_url, EXTRACTION_PATH);
        let body = ExtractionRequest {
            user_input: content,
            instruction: instruction.filter(|i| !i.trim().is_empty()),
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Enhancement(describe_status(status, &text)));
        }

        let payload: ExtractionResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Enhancement(format!("invalid extraction response: {e}")))?;

        if let Some(error) = payload.error.filter(|e| !e.trim().is_empty()) {
            return Err(SearchError::Enhancement(error));
        }
        payload
            .search_term
            .map(|term| term.trim().to_owned())
            .filter(|term| !term.is_empty())
            .ok_or_else(|| SearchError::Enhancement("no search term in extraction response".into()))
    }

    fn name(&self) -> &'static str {
        "extraction"
    }
}

/// Offline extractor: hashtags if present, otherwise the leading words.
#[derive(Debug, Default, Clone, Copy)]
pub struct MockTermExtractor;

/// Derive a search term from content without any network call.
pub fn derive_term(content: &str) -> String {
    let hashtags: Vec<&str> = content
        .split_whitespace()
        .filter_map(|word| word.strip_prefix('#'))
        .map(|tag| tag.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|tag| tag.chars().next().is_some_and(char::is_alphabetic))
        .collect();
    if !hashtags.is_empty() {
        return hashtags.join(" ").to_lowercase();
    }

    let words: Vec<String> = content
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric())
                .to_lowercase()
        })
        .filter(|word| word.len() > 3)
        .take(MOCK_TERM_WORDS)
        .collect();
    if words.is_empty() {
        FALLBACK_TERM.to_owned()
    } else {
        words.join(" ")
    }
}

impl Enricher for MockTermExtractor {
    async fn extract_term(
        &self,
        content: &str,
        _instruction: Option<&str>,
    ) -> Result<String, SearchError> {
        Ok(derive_term(content))
    }

    fn name(&self) -> &'static str {
        "mock-extraction"
    }
}

/// The extractor selected from configuration.
#[derive(Debug)]
pub enum Extractor {
    /// Live extraction endpoint.
    Live(HttpTermExtractor),
    /// Local derivation.
    Mock(MockTermExtractor),
}

impl Extractor {
    /// Pick the extractor for `config`: live with a credential, mock without.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the live extractor cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SearchError> {
        if config.is_mock() {
            Ok(Self::Mock(MockTermExtractor))
        } else {
            Ok(Self::Live(HttpTermExtractor::new(config)?))
        }
    }
}

impl Enricher for Extractor {
    async fn extract_term(
        &self,
        content: &str,
        instruction: Option<&str>,
    ) -> Result<String, SearchError> {
        match self {
            Self::Live(extractor) => extractor.extract_term(content, instruction).await,
            Self::Mock(extractor) => extractor.extract_term(content, instruction).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Live(extractor) => extractor.name(),
            Self::Mock(extractor) => extractor.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn extractor_for(server: &MockServer) -> HttpTermExtractor {
        let config = UpstreamConfig {
            api_key: Some("test-key".into()),
            base_url: format!("{}/api", server.uri()),
            ..Default::default()
        };
        HttpTermExtractor::new(&config).expect("extractor")
    }

    #[test]
    fn derive_term_prefers_hashtags() {
        assert_eq!(derive_term("Loving #Rust and #async! today"), "rust async");
    }

    #[test]
    fn derive_term_uses_leading_long_words() {
        assert_eq!(
            derive_term("This is mock tweet #1 about climate policy."),
            "this mock tweet about"
        );
        assert_eq!(
            derive_term("New results, from large-scale quantum experiments"),
            "results from large-scale quantum"
        );
    }

    #[test]
    fn derive_term_falls_back_when_nothing_usable() {
        assert_eq!(derive_term("a b c"), FALLBACK_TERM);
        assert_eq!(derive_term(""), FALLBACK_TERM);
    }

    #[tokio::test]
    async fn mock_extractor_never_fails() {
        let term = MockTermExtractor
            .extract_term("#AI trending", None)
            .await
            .expect("term");
        assert_eq!(term, "ai");
        assert!(!MockTermExtractor.supports_batch());
    }

    #[tokio::test]
    async fn default_batch_is_unsupported() {
        let err = MockTermExtractor.enrich_batch(&[], None).await.unwrap_err();
        assert!(matches!(err, SearchError::Enhancement(_)));
    }

    #[tokio::test]
    async fn live_extractor_posts_user_input() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search/extraction"))
            .and(header("authorization", "Bearer test-key"))
            .and(body_json(json!({"userInput": "big news about rust"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"searchTerm": " rust news "})))
            .expect(1)
            .mount(&server)
            .await;

        let term = extractor_for(&server)
            .extract_term("big news about rust", None)
            .await
            .expect("term");
        assert_eq!(term, "rust news");
    }

    #[tokio::test]
    async fn live_extractor_forwards_instruction() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search/extraction"))
            .and(body_json(json!({"userInput": "text", "instruction": "focus on people"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"searchTerm": "people"})))
            .expect(1)
            .mount(&server)
            .await;

        let term = extractor_for(&server)
            .extract_term("text", Some("focus on people"))
            .await
            .expect("term");
        assert_eq!(term, "people");
    }

    #[tokio::test]
    async fn live_extractor_maps_failures_to_enhancement_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search/extraction"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .mount(&server)
            .await;

        let err = extractor_for(&server)
            .extract_term("text", None)
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Enhancement(_)));
        assert!(err.to_string().contains("500"));
    }

    #[tokio::test]
    async fn live_extractor_rejects_empty_term() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/v1/search/extraction"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"searchTerm": ""})))
            .mount(&server)
            .await;

        let err = extractor_for(&server)
            .extract_term("text", None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("no search term"));
    }

    #[test]
    fn extractor_selection_follows_credential() {
        let mock = Extractor::from_config(&UpstreamConfig::default()).expect("extractor");
        assert_eq!(mock.name(), "mock-extraction");

        let live = Extractor::from_config(&UpstreamConfig {
            api_key: Some("k".into()),
            ..Default::default()
        })
        .expect("extractor");
        assert_eq!(live.name(), "extraction");
    }
}
