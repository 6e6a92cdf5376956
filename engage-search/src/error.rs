//! Error types for the engage-search crate.
//!
//! All errors use stable string messages suitable for display to callers.
//! No API keys or credentials appear in error messages.

/// Errors that can occur while running or post-processing a search job.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    /// The query was rejected before any upstream call was made.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Invalid client, polling or enhancement configuration.
    #[error("config error: {0}")]
    Config(String),

    /// The upstream refused the job at submission time.
    ///
    /// `status` carries the upstream HTTP status when the refusal came from
    /// a non-success response; it is `None` when the response was 2xx but
    /// carried an error or no job identifier.
    #[error("submission failed: {message}")]
    Submission {
        /// Upstream HTTP status, if any.
        status: Option<u16>,
        /// Upstream-provided or locally derived message.
        message: String,
    },

    /// A network-level failure talking to the upstream.
    #[error("transport error: {0}")]
    Transport(String),

    /// The upstream explicitly reported that the job failed.
    #[error("job failed: {0}")]
    JobFailed(String),

    /// The polling deadline elapsed while the job was still pending.
    #[error("job timed out after {attempts} polls ({elapsed_ms}ms)")]
    Timeout {
        /// Number of status polls issued before giving up.
        attempts: u32,
        /// Milliseconds elapsed since submission.
        elapsed_ms: u64,
    },

    /// Enrichment of one item or one batch failed.
    #[error("enhancement error: {0}")]
    Enhancement(String),
}

impl SearchError {
    /// Returns `true` if resubmitting the same query may succeed.
    ///
    /// Only a timeout qualifies: the job may still complete server-side.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Convenience type alias for engage-search results.
pub type Result<T> = std::result::Result<T, SearchError>;
