//! Live client for the upstream live-search job API.
//!
//! Wire contract:
//!
//! - `POST {base}/v1/search/live/twitter` with `{query, max_results}` → `{uuid, error?}`
//! - `GET {base}/v1/search/live/twitter/status/{uuid}` → `{status, error?}`
//! - `GET {base}/v1/search/live/twitter/result/{uuid}` → array of items
//!
//! Items arrive as `{ID, Content, Metadata: {public_metrics: {...}}, Score}`;
//! the upstream `Score` is dropped since ranking is computed locally.

use serde::{Deserialize, Serialize};

use crate::client::JobClient;
use crate::config::UpstreamConfig;
use crate::error::SearchError;
use crate::http::{build_client, describe_status, endpoint, transport_error};
use crate::types::{EngagementMetrics, JobHandle, JobStatus, ResultItem, SearchQuery};

const SUBMIT_PATH: &str = "v1/search/live/twitter";
const STATUS_PATH: &str = "v1/search/live/twitter/status";
const RESULT_PATH: &str = "v1/search/live/twitter/result";

#[derive(Debug, Serialize)]
struct SubmitRequest<'a> {
    query: &'a str,
    max_results: u32,
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    #[serde(default)]
    uuid: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct StatusResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireItem {
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "Content", default)]
    content: String,
    #[serde(rename = "Metadata", default)]
    metadata: Option<WireMetadata>,
}

#[derive(Debug, Default, Deserialize)]
struct WireMetadata {
    #[serde(default)]
    public_metrics: Option<WireMetrics>,
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
struct WireMetrics {
    retweet_count: u64,
    like_count: u64,
    quote_count: u64,
    reply_count: u64,
    bookmark_count: u64,
}

impl From<WireItem> for ResultItem {
    fn from(wire: WireItem) -> Self {
        let metadata = wire.metadata.unwrap_or_default();
        let metrics = metadata.public_metrics.unwrap_or_default();
        Self {
            id: wire.id,
            content: wire.content,
            engagement_metrics: EngagementMetrics {
                retweet_count: metrics.retweet_count,
                like_count: metrics.like_count,
                quote_count: metrics.quote_count,
                reply_count: metrics.reply_count,
                bookmark_count: metrics.bookmark_count,
            },
            score: None,
            source_url: metadata.url,
        }
    }
}

/// Interpret a status payload.
///
/// A non-empty `error` field wins over whatever `status` says. Unknown
/// status strings are treated as still processing so that the deadline,
/// not a parse failure, ends the run.
pub(crate) fn parse_status(response: StatusResponse) -> JobStatus {
    if let Some(reason) = non_empty(response.error) {
        return JobStatus::Failed(reason);
    }
    let raw = response.status.unwrap_or_default();
    match raw.trim().to_ascii_lowercase().as_str() {
        "done" => JobStatus::Done,
        "pending" => JobStatus::Pending,
        "processing" | "in progress" => JobStatus::Processing,
        "error" | "failed" => JobStatus::Failed("job failed with error".into()),
        other => {
            tracing::debug!(status = other, "unrecognised job status, treating as processing");
            JobStatus::Processing
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// [`JobClient`] backed by the live upstream API.
pub struct MasaJobClient {
    client: reqwest::Client,
    base_url: String,
}

impl std::fmt::Debug for MasaJobClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MasaJobClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl MasaJobClient {
    /// Create a client from upstream settings.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the settings are invalid or no
    /// credential is configured.
    pub fn new(config: &UpstreamConfig) -> Result<Self, SearchError> {
        config.validate()?;
        if config.is_mock() {
            return Err(SearchError::Config("API key is required".into()));
        }
        Ok(Self {
            client: build_client(config)?,
            base_url: config.base_url.clone(),
        })
    }
}

impl JobClient for MasaJobClient {
    async fn submit(&self, query: &SearchQuery) -> Result<JobHandle, SearchError> {
        let url = endpoint(&self.base_url, SUBMIT_PATH);
        let body = SubmitRequest {
            query: query.text(),
            max_results: query.max_results(),
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
            return Err(SearchError::Submission {
                status: Some(status.as_u16()),
                message: describe_status(status, &text),
            });
        }

        let payload: SubmitResponse = response.json().await.map_err(|e| SearchError::Submission {
            status: None,
            message: format!("invalid job submission response: {e}"),
        })?;

        if let Some(error) = non_empty(payload.error) {
            return Err(SearchError::Submission {
                status: None,
                message: error,
            });
        }

        match non_empty(payload.uuid) {
            Some(uuid) => Ok(JobHandle::new(uuid)),
            None => Err(SearchError::Submission {
                status: None,
                message: "no job identifier in submission response".into(),
            }),
        }
    }

    async fn poll_status(&self, handle: &JobHandle) -> Result<JobStatus, SearchError> {
        let url = endpoint(&self.base_url, &format!("{STATUS_PATH}/{}", handle.id()));
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Transport(describe_status(status, &text)));
        }

        let payload: StatusResponse = response
            .json()
            .await
            .map_err(|e| SearchError::Transport(format!("invalid status response: {e}")))?;
        Ok(parse_status(payload))
    }

    async fn fetch_results(&self, handle: JobHandle) -> Result<Vec<ResultItem>, SearchError> {
        let url = endpoint(&self.base_url, &format!("{RESULT_PATH}/{}", handle.id()));
        let response = self.client.get(&url).send().await.map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(SearchError::Transport(describe_status(status, &text)));
        }

        let items: Option<Vec<WireItem>> = response
            .json()
            .await
            .map_err(|e| SearchError::Transport(format!("invalid result payload: {e}")))?;
        Ok(items
            .unwrap_or_default()
            .into_iter()
            .map(ResultItem::from)
            .collect())
    }

    fn name(&self) -> &'static str {
        "masa"
    }
}
