//! Job lifecycle driver: submit, poll with backoff, retrieve.
//!
//! # State Machine
//!
//! ```text
//! ┌────────────┐  handle   ┌─────────┐  Done   ┌────────────┐  items  ┌───────────┐
//! │ Submitting ├──────────►│ Polling ├────────►│ Retrieving ├────────►│ Succeeded │
//! └─────┬──────┘           └──┬───┬──┘         └─────┬──────┘         └───────────┘
//!       │ error      Failed   │   │ deadline         │ error
//!       ▼                     ▼   ▼                  ▼
//!   ┌────────┐◄───────────────┘ ┌──────────┐    ┌────────┐
//!   │ Failed │                  │ TimedOut │    │ Failed │
//!   └────────┘                  └──────────┘    └────────┘
//! ```
//!
//! Transport errors while polling are tolerated; the loop keeps its
//! schedule. Everything else is fatal and never retried here.

use tokio::time::Instant;

use crate::client::JobClient;
use crate::config::PollConfig;
use crate::error::SearchError;
use crate::types::{JobHandle, JobStatus, ResultItem, SearchQuery};

use super::backoff::{backoff_delay, next_wait};

/// Lifecycle state of one orchestrator run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// Sending the job to the upstream.
    Submitting,
    /// Waiting for a terminal status.
    Polling,
    /// Downloading the results of a finished job.
    Retrieving,
    /// Results retrieved.
    Succeeded,
    /// Deadline elapsed while the job was still pending.
    TimedOut,
    /// Submission, job or retrieval failure.
    Failed,
}

impl RunState {
    /// The terminal state a finished run ended in.
    pub fn of<T>(result: &Result<T, SearchError>) -> Self {
        match result {
            Ok(_) => Self::Succeeded,
            Err(SearchError::Timeout { .. }) => Self::TimedOut,
            Err(_) => Self::Failed,
        }
    }

    /// Returns `true` for `Succeeded`, `TimedOut` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded | Self::TimedOut | Self::Failed)
    }
}

/// Drives one job per [`run`](Self::run) call against a [`JobClient`].
///
/// Holds no per-run state, so a single orchestrator can serve many
/// concurrent queries.
#[derive(Debug)]
pub struct PollingOrchestrator<C> {
    client: C,
    config: PollConfig,
}

impl<C: JobClient> PollingOrchestrator<C> {
    /// Create an orchestrator over `client` with the given schedule.
    pub fn new(client: C, config: PollConfig) -> Self {
        Self { client, config }
    }

    /// The wrapped client.
    pub fn client(&self) -> &C {
        &self.client
    }

    /// The polling schedule.
    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    /// Run the full lifecycle for `query`.
    ///
    /// # Pipeline
    ///
    /// 1. Submit the job; any failure is final
    /// 2. Poll with exponential backoff until `Done`, `Failed` or the deadline
    /// 3. Fetch the results exactly once
    ///
    /// # Errors
    ///
    /// - [`SearchError::Submission`] / [`SearchError::Transport`] from submission
    /// - [`SearchError::JobFailed`] if the upstream reports failure
    /// - [`SearchError::Timeout`] if the deadline elapses first
    /// - [`SearchError::Transport`] if retrieval fails
    pub async fn run(&self, query: &SearchQuery) -> Result<Vec<ResultItem>, SearchError> {
        let result = self.drive(query).await;
        let state = RunState::of(&result);
        match &result {
            Ok(items) => tracing::debug!(?state, count = items.len(), "search job finished"),
            Err(err) => tracing::warn!(?state, error = %err, "search job did not succeed"),
        }
        result
    }

    async fn drive(&self, query: &SearchQuery) -> Result<Vec<ResultItem>, SearchError> {
        // 1. Submit.
        tracing::debug!(state = ?RunState::Submitting, client = self.client.name(), query = query.text(), "submitting search job");
        let handle = self.client.submit(query).await?;
        tracing::debug!(job_id = %handle, "search job submitted");

        // 2. Poll.
        self.poll_until_done(&handle).await?;

        // 3. Retrieve.
        tracing::debug!(state = ?RunState::Retrieving, job_id = %handle, "fetching job results");
        self.client.fetch_results(handle).await
    }

    async fn poll_until_done(&self, handle: &JobHandle) -> Result<(), SearchError> {
        let started = Instant::now();
        let mut attempt: u32 = 0;

        loop {
            let elapsed = started.elapsed();
            if elapsed >= self.config.timeout {
                return Err(SearchError::Timeout {
                    attempts: attempt,
                    elapsed_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
                });
            }

            attempt += 1;
            tracing::debug!(
                state = ?RunState::Polling,
                job_id = %handle,
                attempt,
                elapsed_ms = elapsed.as_millis() as u64,
                wait_ms = backoff_delay(&self.config, attempt).as_millis() as u64,
                "polling job status"
            );

            match self.client.poll_status(handle).await {
                Ok(JobStatus::Done) => return Ok(()),
                Ok(JobStatus::Failed(reason)) => return Err(SearchError::JobFailed(reason)),
                Ok(status) => tracing::debug!(job_id = %handle, %status, "job not finished"),
                Err(err) => {
                    tracing::warn!(job_id = %handle, attempt, error = %err, "status poll failed, retrying");
                }
            }

            let wait = next_wait(&self.config, attempt, started.elapsed());
            tokio::time::sleep(wait).await;
        }
    }
}
