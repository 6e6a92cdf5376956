//! Error types for the engage service.
//!
//! [`ServiceError`] covers startup (configuration, binding). [`ApiError`]
//! is what request handlers return; each variant maps to one HTTP status
//! and renders as `{"error": "message"}`.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use engage_search::SearchError;
use serde_json::json;

/// Top-level error type for service startup.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error (listener bind, local address lookup).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Search pipeline construction error.
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Convenience result type.
pub type Result<T> = std::result::Result<T, ServiceError>;

/// Handler error rendered as a JSON response.
///
/// - `BadRequest` → 400
/// - `NotFound` → 404
/// - `Internal` → 500
/// - `BadGateway` → 502
/// - `GatewayTimeout` → 504
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    /// Invalid request body or parameters (400).
    BadRequest(String),
    /// Unknown tool or route target (404).
    NotFound(String),
    /// Job failure or transport failure (500).
    Internal(String),
    /// Upstream rejected the submission for a non-client reason (502).
    BadGateway(String),
    /// The job did not finish before the deadline (504).
    GatewayTimeout(String),
}

impl ApiError {
    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            Self::BadGateway(_) => StatusCode::BAD_GATEWAY,
            Self::GatewayTimeout(_) => StatusCode::GATEWAY_TIMEOUT,
        }
    }

    /// Client-facing message.
    pub fn message(&self) -> &str {
        match self {
            Self::BadRequest(m)
            | Self::NotFound(m)
            | Self::Internal(m)
            | Self::BadGateway(m)
            | Self::GatewayTimeout(m) => m,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(status = status.as_u16(), error = self.message(), "request failed");
        }
        (status, Json(json!({ "error": self.message() }))).into_response()
    }
}

impl From<SearchError> for ApiError {
    fn from(err: SearchError) -> Self {
        let message = err.to_string();
        match err {
            SearchError::InvalidQuery(_) | SearchError::Config(_) => Self::BadRequest(message),
            SearchError::Submission {
                status: Some(code), ..
            } if (400..500).contains(&code) => Self::BadRequest(message),
            SearchError::Submission { .. } => Self::BadGateway(message),
            SearchError::Timeout { .. } => Self::GatewayTimeout(message),
            SearchError::JobFailed(_) | SearchError::Transport(_) | SearchError::Enhancement(_) => {
                Self::Internal(message)
            }
        }
    }
}
