//! Job client implementations.

pub mod masa;
pub mod mock;

pub use masa::MasaJobClient;
pub use mock::{mock_items, MockJobClient};

use crate::client::JobClient;
use crate::config::UpstreamConfig;
use crate::error::SearchError;
use crate::types::{JobHandle, JobStatus, ResultItem, SearchQuery};

/// The backend selected from configuration: live when a credential is
/// present, mock otherwise.
#[derive(Debug)]
pub enum Upstream {
    /// Live upstream job API.
    Live(MasaJobClient),
    /// Local synthetic data.
    Mock(MockJobClient),
}

impl Upstream {
    /// Pick the backend for `config`.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the live client cannot be built.
    pub fn from_config(config: &UpstreamConfig) -> Result<Self, SearchError> {
        if config.is_mock() {
            tracing::info!("no API key configured, using mock job client");
            Ok(Self::Mock(MockJobClient::default()))
        } else {
            Ok(Self::Live(MasaJobClient::new(config)?))
        }
    }

    /// Returns `true` for the mock backend.
    pub fn is_mock(&self) -> bool {
        matches!(self, Self::Mock(_))
    }
}

impl JobClient for Upstream {
    async fn submit(&self, query: &SearchQuery) -> Result<JobHandle, SearchError> {
        match self {
            Self::Live(client) => client.submit(query).await,
            Self::Mock(client) => client.submit(query).await,
        }
    }

    async fn poll_status(&self, handle: &JobHandle) -> Result<JobStatus, SearchError> {
        match self {
            Self::Live(client) => client.poll_status(handle).await,
            Self::Mock(client) => client.poll_status(handle).await,
        }
    }

    async fn fetch_results(&self, handle: JobHandle) -> Result<Vec<ResultItem>, SearchError> {
        match self {
            Self::Live(client) => client.fetch_results(handle).await,
            Self::Mock(client) => client.fetch_results(handle).await,
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Self::Live(client) => client.name(),
            Self::Mock(client) => client.name(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_credential_selects_mock() {
        let upstream = Upstream::from_config(&UpstreamConfig::default()).expect("upstream");
        assert!(upstream.is_mock());
        assert_eq!(upstream.name(), "mock");
    }

    #[test]
    fn credential_selects_live() {
        let config = UpstreamConfig {
            api_key: Some("key".into()),
            ..Default::default()
        };
        let upstream = Upstream::from_config(&config).expect("upstream");
        assert!(!upstream.is_mock());
        assert_eq!(upstream.name(), "masa");
    }
}
