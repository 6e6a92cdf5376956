//! HTTP surface for the search service.
//!
//! ## Endpoints
//!
//! - `GET /health`: liveness, version and mock-mode flag
//! - `POST /search`: ranked results (`/api/search` alias)
//! - `POST /search/enhance`: ranked results with the top K enriched
//!   (`/api/masa/enhance`, `/api/masa/searchTerm` aliases)
//! - `GET /tools`: canonical tool names
//! - `POST /tools`: closed tool dispatch (`/mcp` alias)

use std::net::SocketAddr;
use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::response::Json;
use axum::routing::{get, post};
use chrono::{DateTime, Utc};
use engage_search::{OutcomeItem, ResultItem, SearchQuery, SearchService};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::ServerConfig;
use crate::error::{ApiError, Result};
use crate::tools::{ToolCall, ToolRequest};

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

/// Body of `POST /search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchRequest {
    /// Query text. Required.
    #[serde(default)]
    pub query: Option<String>,
    /// Number of results to request from the upstream.
    #[serde(default, rename = "maxResults", alias = "max_results")]
    pub max_results: Option<u32>,
}

/// Body of `POST /search/enhance`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnhanceRequest {
    /// Query text. Required.
    #[serde(default)]
    pub query: Option<String>,
    /// Number of results to request from the upstream.
    #[serde(default, rename = "maxResults", alias = "max_results")]
    pub max_results: Option<u32>,
    /// How many top-ranked results to enrich; service default when absent.
    #[serde(default, rename = "enhanceTopX", alias = "enhance_top_x")]
    pub enhance_top_x: Option<usize>,
    /// Steering instruction forwarded to the enricher.
    #[serde(default, rename = "customInstruction", alias = "custom_instruction")]
    pub custom_instruction: Option<String>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// `{results: [...]}` envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultsResponse<T> {
    /// Result entries in rank order.
    pub results: Vec<T>,
}

/// Response from `GET /health`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Always `"ok"`.
    pub status: String,
    /// Crate version.
    pub version: String,
    /// Time the check was answered.
    pub timestamp: DateTime<Utc>,
    /// Whether results are synthetic.
    pub mock: bool,
}

/// Response from `GET /tools`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolListResponse {
    /// Canonical tool names.
    pub tools: Vec<String>,
}

/// Output of a tool invocation.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ToolOutput {
    /// Ranked items (`search`, `rank-by-engagement`).
    Items(Vec<ResultItem>),
    /// Extracted term (`extract-term`).
    Term {
        /// The extracted search term.
        #[serde(rename = "searchTerm")]
        search_term: String,
        /// Always `true`; failures are reported as errors.
        success: bool,
    },
}

// ---------------------------------------------------------------------------
// Shared application state
// ---------------------------------------------------------------------------

#[derive(Clone)]
struct AppState {
    service: Arc<SearchService>,
}

/// Build the application router over `service`.
pub fn router(service: Arc<SearchService>) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route("/search", post(handle_search))
        .route("/api/search", post(handle_search))
        .route("/search/enhance", post(handle_enhance))
        .route("/api/masa/enhance", post(handle_enhance))
        .route("/api/masa/searchTerm", post(handle_enhance))
        .route("/tools", get(handle_list_tools).post(handle_tool))
        .route("/mcp", post(handle_tool))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(AppState { service })
}

// ---------------------------------------------------------------------------
// Server
// ---------------------------------------------------------------------------

/// The search HTTP server running in a background task.
pub struct Server {
    addr: SocketAddr,
    handle: JoinHandle<()>,
}

impl Server {
    /// Bind to `{config.host}:{config.port}` (port `0` auto-assigns) and
    /// start serving in a background tokio task.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::Io`](crate::error::ServiceError::Io) if the
    /// listener cannot bind.
    pub async fn start(service: Arc<SearchService>, config: &ServerConfig) -> Result<Self> {
        let mock = service.is_mock();
        let app = router(service);

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;
        info!(%addr, mock, "search server listening");

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!("search server error: {e}");
            }
        });

        Ok(Self { addr, handle })
    }

    /// Returns the address the server is listening on.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the port the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// Abort the server task.
    pub fn shutdown(&self) {
        self.handle.abort();
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> std::result::Result<T, ApiError> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| ApiError::BadRequest(rejection.body_text()))
}

fn build_query(query: Option<String>, max_results: Option<u32>) -> std::result::Result<SearchQuery, ApiError> {
    let text = query
        .filter(|q| !q.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Query is required".into()))?;
    Ok(SearchQuery::new(text, max_results)?)
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

/// `GET /health`
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_owned(),
        version: env!("CARGO_PKG_VERSION").to_owned(),
        timestamp: Utc::now(),
        mock: state.service.is_mock(),
    })
}

/// `POST /search`
async fn handle_search(
    State(state): State<AppState>,
    payload: std::result::Result<Json<SearchRequest>, JsonRejection>,
) -> std::result::Result<Json<ResultsResponse<ResultItem>>, ApiError> {
    let request = json_body(payload)?;
    let query = build_query(request.query, request.max_results)?;
    tracing::debug!(query = query.text(), max_results = query.max_results(), "search request");

    let results = state.service.search(&query).await?;
    info!(count = results.len(), "search completed");
    Ok(Json(ResultsResponse { results }))
}

/// `POST /search/enhance`
async fn handle_enhance(
    State(state): State<AppState>,
    payload: std::result::Result<Json<EnhanceRequest>, JsonRejection>,
) -> std::result::Result<Json<ResultsResponse<OutcomeItem>>, ApiError> {
    let request = json_body(payload)?;
    let query = build_query(request.query, request.max_results)?;
    tracing::debug!(
        query = query.text(),
        max_results = query.max_results(),
        top_k = ?request.enhance_top_x,
        "search-and-enhance request"
    );

    let results = state
        .service
        .search_and_enhance(&query, request.enhance_top_x, request.custom_instruction.as_deref())
        .await?;
    let failed = results
        .iter()
        .filter(|r| matches!(r, OutcomeItem::Enhanced(e) if e.is_error()))
        .count();
    info!(count = results.len(), enhancement_failures = failed, "search-and-enhance completed");
    Ok(Json(ResultsResponse { results }))
}

/// `GET /tools`
async fn handle_list_tools() -> Json<ToolListResponse> {
    Json(ToolListResponse {
        tools: ToolCall::NAMES.iter().map(|n| (*n).to_owned()).collect(),
    })
}

/// `POST /tools`
async fn handle_tool(
    State(state): State<AppState>,
    payload: std::result::Result<Json<ToolRequest>, JsonRejection>,
) -> std::result::Result<Json<ToolOutput>, ApiError> {
    let call = ToolCall::parse(json_body(payload)?)?;
    tracing::debug!(tool = call.name(), "tool invocation");

    let output = match call {
        ToolCall::Search { query, max_results } => {
            let query = build_query(Some(query), max_results)?;
            ToolOutput::Items(state.service.search(&query).await?)
        }
        ToolCall::RankByEngagement { items } => ToolOutput::Items(state.service.rank(items)),
        ToolCall::ExtractTerm {
            content,
            instruction,
        } => ToolOutput::Term {
            search_term: state
                .service
                .extract_term(&content, instruction.as_deref())
                .await?,
            success: true,
        },
    };
    Ok(Json(output))
}
