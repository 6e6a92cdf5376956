//! Search configuration with sensible defaults.
//!
//! [`SearchServiceConfig`] bundles the upstream connection, the polling
//! schedule and the enhancement settings. Nothing here is global: the
//! service receives its configuration at construction time.

use std::fmt;
use std::time::Duration;

use crate::error::SearchError;

/// Default upstream API root.
pub const DEFAULT_BASE_URL: &str = "https://data.dev.masalabs.ai/api";

/// Polling schedule for one orchestrator run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollConfig {
    /// Wait after the first non-terminal poll; grows by 1.5x per attempt.
    pub base_interval: Duration,
    /// Ceiling on the wait between polls.
    pub max_interval: Duration,
    /// Deadline measured from successful submission.
    pub timeout: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            base_interval: Duration::from_millis(2_000),
            max_interval: Duration::from_millis(10_000),
            timeout: Duration::from_millis(120_000),
        }
    }
}

impl PollConfig {
    /// Validates this configuration.
    ///
    /// Checks:
    /// - `base_interval` must be greater than 0
    /// - `base_interval` must be <= `max_interval`
    /// - `timeout` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.base_interval.is_zero() {
            return Err(SearchError::Config(
                "base_interval must be greater than 0".into(),
            ));
        }
        if self.base_interval > self.max_interval {
            return Err(SearchError::Config(
                "base_interval must be <= max_interval".into(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(SearchError::Config("timeout must be greater than 0".into()));
        }
        Ok(())
    }
}

/// Settings for the optional top-K enrichment pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnhancementConfig {
    /// When `false`, the enhancement stage is an identity pass.
    pub enabled: bool,
    /// How many top-ranked items to enrich when the caller does not say.
    pub default_top_k: usize,
    /// Maximum in-flight per-item enrichment calls. `1` is strictly sequential.
    pub concurrency: usize,
}

impl Default for EnhancementConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            default_top_k: 3,
            concurrency: 1,
        }
    }
}

impl EnhancementConfig {
    /// Validates this configuration.
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.concurrency == 0 {
            return Err(SearchError::Config(
                "enhancement concurrency must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Connection settings for the upstream job API.
#[derive(Clone)]
pub struct UpstreamConfig {
    /// Bearer credential. `None` (or blank) selects mock mode.
    pub api_key: Option<String>,
    /// API root, without trailing slash.
    pub base_url: String,
    /// Per-request HTTP timeout in seconds.
    pub request_timeout_seconds: u64,
    /// Custom User-Agent string. If `None`, the crate name and version are sent.
    pub user_agent: Option<String>,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.into(),
            request_timeout_seconds: 30,
            user_agent: None,
        }
    }
}

// Keep the credential out of logs.
impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("request_timeout_seconds", &self.request_timeout_seconds)
            .field("user_agent", &self.user_agent)
            .finish()
    }
}

impl UpstreamConfig {
    /// The credential, if one is configured and non-blank.
    pub fn credential(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Returns `true` when no credential is configured.
    pub fn is_mock(&self) -> bool {
        self.credential().is_none()
    }

    /// Validates this configuration.
    ///
    /// Checks:
    /// - `base_url` must parse as an absolute http(s) URL
    /// - `request_timeout_seconds` must be greater than 0
    pub fn validate(&self) -> Result<(), SearchError> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| SearchError::Config(format!("invalid base_url: {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(SearchError::Config(format!(
                "base_url must use http or https, got {}",
                parsed.scheme()
            )));
        }
        if self.request_timeout_seconds == 0 {
            return Err(SearchError::Config(
                "request_timeout_seconds must be greater than 0".into(),
            ));
        }
        Ok(())
    }
}

/// Everything [`SearchService`](crate::service::SearchService) needs.
#[derive(Debug, Clone, Default)]
pub struct SearchServiceConfig {
    /// Upstream connection.
    pub upstream: UpstreamConfig,
    /// Polling schedule.
    pub poll: PollConfig,
    /// Enhancement stage settings.
    pub enhancement: EnhancementConfig,
}

impl SearchServiceConfig {
    /// Validates every section.
    pub fn validate(&self) -> Result<(), SearchError> {
        self.upstream.validate()?;
        self.poll.validate()?;
        self.enhancement.validate()
    }
}
