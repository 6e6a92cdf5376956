//! Trait definition for job-based search backends.
//!
//! Each backend (the live upstream API, the offline mock) implements
//! [`JobClient`] to provide the three single-attempt calls the
//! orchestrator drives: submit, poll, fetch.

use crate::error::SearchError;
use crate::types::{JobHandle, JobStatus, ResultItem, SearchQuery};

/// A thin, single-attempt adapter over an asynchronous job API.
///
/// Implementations never retry; the polling orchestrator owns retries
/// and deadlines. All implementations must be `Send + Sync` so that
/// independent queries can run concurrently against one client.
pub trait JobClient: Send + Sync {
    /// Submit a search job.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Submission`] if the upstream answers with a
    /// non-success status, reports an error, or omits the job identifier.
    fn submit(
        &self,
        query: &SearchQuery,
    ) -> impl std::future::Future<Output = Result<JobHandle, SearchError>> + Send;

    /// Read the current status of a job.
    ///
    /// A [`JobStatus::Failed`] value is a normal return, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Transport`] on network or protocol failure.
    fn poll_status(
        &self,
        handle: &JobHandle,
    ) -> impl std::future::Future<Output = Result<JobStatus, SearchError>> + Send;

    /// Fetch the results of a finished job, consuming its handle.
    ///
    /// The caller must only call this after observing [`JobStatus::Done`].
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Transport`] if the results cannot be fetched,
    /// including when the job has not reached `Done`.
    fn fetch_results(
        &self,
        handle: JobHandle,
    ) -> impl std::future::Future<Output = Result<Vec<ResultItem>, SearchError>> + Send;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}
