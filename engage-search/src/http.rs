//! Shared HTTP client for upstream requests.
//!
//! Provides a configured [`reqwest::Client`] carrying the bearer credential,
//! a JSON content type and the configured timeout, plus helpers that turn
//! upstream failures into stable messages.

use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE};

use crate::config::UpstreamConfig;
use crate::error::SearchError;

/// User-Agent sent when the config does not override it.
const DEFAULT_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// Build a [`reqwest::Client`] configured for the upstream job API.
///
/// The client has:
/// - `Authorization: Bearer <key>` on every request (when a credential is set)
/// - `Content-Type: application/json`
/// - Timeout from config
/// - Custom or crate-derived User-Agent
///
/// # Errors
///
/// Returns [`SearchError::Config`] if the credential is not a valid header
/// value, or [`SearchError::Transport`] if the client cannot be constructed.
pub fn build_client(config: &UpstreamConfig) -> Result<reqwest::Client, SearchError> {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if let Some(key) = config.credential() {
        let mut value = HeaderValue::from_str(&format!("Bearer {key}"))
            .map_err(|_| SearchError::Config("api key contains invalid characters".into()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }

    let ua = config
        .user_agent
        .clone()
        .unwrap_or_else(|| DEFAULT_USER_AGENT.to_owned());

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(config.request_timeout_seconds))
        .user_agent(ua)
        .build()
        .map_err(|e| SearchError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Join the API root and an endpoint path without doubling slashes.
pub fn endpoint(base_url: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base_url.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// Format a non-success upstream response.
pub fn describe_status(status: reqwest::StatusCode, body: &str) -> String {
    format!("API Error: {} - {}", status.as_u16(), body.trim())
}

/// Map a request-level [`reqwest::Error`] to a transport error.
pub fn transport_error(err: reqwest::Error) -> SearchError {
    if err.is_timeout() {
        SearchError::Transport("request timed out".into())
    } else if err.is_connect() {
        SearchError::Transport("no response received from API".into())
    } else {
        SearchError::Transport(format!("request error: {err}"))
    }
}
