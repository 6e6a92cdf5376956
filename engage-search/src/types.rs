//! Core types for search jobs, result items and enhancement output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::SearchError;

/// Number of results requested when the caller does not specify one.
pub const DEFAULT_MAX_RESULTS: u32 = 10;

/// Upper bound on `max_results` accepted by the upstream.
pub const MAX_RESULTS_LIMIT: u32 = 100;

/// A validated search request. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchQuery {
    text: String,
    max_results: u32,
}

impl SearchQuery {
    /// Build a query, applying [`DEFAULT_MAX_RESULTS`] when `max_results` is `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidQuery`] if the text is blank or
    /// `max_results` lies outside `1..=100`.
    pub fn new(text: impl Into<String>, max_results: Option<u32>) -> Result<Self, SearchError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(SearchError::InvalidQuery("query text must not be empty".into()));
        }
        let max_results = max_results.unwrap_or(DEFAULT_MAX_RESULTS);
        if !(1..=MAX_RESULTS_LIMIT).contains(&max_results) {
            return Err(SearchError::InvalidQuery(format!(
                "max_results must be between 1 and {MAX_RESULTS_LIMIT}, got {max_results}"
            )));
        }
        Ok(Self { text, max_results })
    }

    /// The raw query text, passed to the upstream verbatim.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Maximum number of items the upstream should return.
    pub fn max_results(&self) -> u32 {
        self.max_results
    }
}

/// Opaque identifier of one in-flight upstream job.
///
/// Deliberately not `Clone`: [`JobClient::fetch_results`](crate::client::JobClient::fetch_results)
/// takes the handle by value, so a handle backs at most one retrieval.
#[derive(Debug, PartialEq, Eq)]
pub struct JobHandle {
    id: String,
}

impl JobHandle {
    /// Wrap an upstream job identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    /// The upstream job identifier.
    pub fn id(&self) -> &str {
        &self.id
    }
}

impl fmt::Display for JobHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.id)
    }
}

/// Status of an upstream job, read fresh on every poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    /// Accepted but not started.
    Pending,
    /// Being worked on.
    Processing,
    /// Results are ready to fetch.
    Done,
    /// The upstream gave up on the job.
    Failed(String),
}

impl JobStatus {
    /// Returns `true` for `Done` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed(_))
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("pending"),
            Self::Processing => f.write_str("processing"),
            Self::Done => f.write_str("done"),
            Self::Failed(reason) => write!(f, "error: {reason}"),
        }
    }
}

/// Interaction counts attached to a result item.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngagementMetrics {
    /// Number of reposts.
    pub retweet_count: u64,
    /// Number of likes.
    pub like_count: u64,
    /// Number of quote posts.
    pub quote_count: u64,
    /// Number of replies.
    pub reply_count: u64,
    /// Number of bookmarks.
    pub bookmark_count: u64,
}

/// A single item returned by a completed search job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultItem {
    /// Upstream item identifier.
    pub id: String,
    /// Item text.
    pub content: String,
    /// Interaction counts used for ranking.
    #[serde(default)]
    pub engagement_metrics: EngagementMetrics,
    /// Engagement score; set by [`rank`](crate::orchestrator::scoring::rank), never by the upstream.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    /// Link to the original item, when the upstream provides one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_url: Option<String>,
}

/// A result item that went through the enhancement stage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhancedItem {
    /// The ranked item as it entered the stage.
    #[serde(rename = "original_tweet")]
    pub original: ResultItem,
    /// Search term extracted from the item content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_term: Option<String>,
    /// Rewritten content returned by a batch enricher.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enriched_content: Option<String>,
    /// Why enrichment did not produce anything for this item.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enhancement_error: Option<String>,
    /// When the stage finished with this item.
    pub processed_at: DateTime<Utc>,
}

impl EnhancedItem {
    /// Item enriched with an extracted search term.
    pub fn with_search_term(original: ResultItem, term: impl Into<String>) -> Self {
        Self {
            original,
            search_term: Some(term.into()),
            enriched_content: None,
            enhancement_error: None,
            processed_at: Utc::now(),
        }
    }

    /// Item enriched with rewritten content.
    pub fn with_enriched_content(original: ResultItem, content: impl Into<String>) -> Self {
        Self {
            original,
            search_term: None,
            enriched_content: Some(content.into()),
            enhancement_error: None,
            processed_at: Utc::now(),
        }
    }

    /// Unmodified pass-through annotated with the enrichment failure.
    pub fn failed(original: ResultItem, error: impl fmt::Display) -> Self {
        Self {
            original,
            search_term: None,
            enriched_content: None,
            enhancement_error: Some(error.to_string()),
            processed_at: Utc::now(),
        }
    }

    /// Returns `true` if enrichment failed for this item.
    pub fn is_error(&self) -> bool {
        self.enhancement_error.is_some()
    }
}

/// One entry of a [`SearchOutcome`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OutcomeItem {
    /// Selected for enhancement.
    Enhanced(EnhancedItem),
    /// Passed through untouched.
    Plain(ResultItem),
}

impl OutcomeItem {
    /// The underlying ranked item.
    pub fn item(&self) -> &ResultItem {
        match self {
            Self::Enhanced(enhanced) => &enhanced.original,
            Self::Plain(item) => item,
        }
    }
}

/// Final, rank-ordered output of a search.
pub type SearchOutcome = Vec<OutcomeItem>;
