//! Offline stand-in for the upstream job API.
//!
//! Used when no credential is configured. It honours the same lifecycle
//! as the live API (submit, poll until done, fetch once) so the
//! orchestrator runs unchanged; only the data is synthetic.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use rand::Rng;

use crate::client::JobClient;
use crate::error::SearchError;
use crate::types::{EngagementMetrics, JobHandle, JobStatus, ResultItem, SearchQuery};

#[derive(Debug)]
struct MockJob {
    query: String,
    max_results: u32,
    polls: u32,
}

/// [`JobClient`] that fabricates results locally.
#[derive(Debug)]
pub struct MockJobClient {
    polls_until_done: u32,
    jobs: Mutex<HashMap<String, MockJob>>,
}

impl Default for MockJobClient {
    fn default() -> Self {
        Self::new(1)
    }
}

impl MockJobClient {
    /// Create a mock whose jobs report `Done` on the `polls_until_done`-th poll.
    pub fn new(polls_until_done: u32) -> Self {
        Self {
            polls_until_done: polls_until_done.max(1),
            jobs: Mutex::new(HashMap::new()),
        }
    }

    /// Number of jobs submitted but not yet fetched.
    pub fn in_flight(&self) -> usize {
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Generate `count` synthetic items mentioning `query`, with random metrics.
pub fn mock_items(query: &str, count: usize) -> Vec<ResultItem> {
    let mut rng = rand::thread_rng();
    (1..=count)
        .map(|n| ResultItem {
            id: format!("mock-tweet-{n}"),
            content: format!("This is mock tweet #{n} about {query}."),
            engagement_metrics: EngagementMetrics {
                retweet_count: rng.gen_range(0..100),
                like_count: rng.gen_range(0..500),
                quote_count: rng.gen_range(0..20),
                reply_count: rng.gen_range(0..50),
                bookmark_count: rng.gen_range(0..10),
            },
            score: None,
            source_url: None,
        })
        .collect()
}

impl JobClient for MockJobClient {
    async fn submit(&self, query: &SearchQuery) -> Result<JobHandle, SearchError> {
        let id = format!("mock-job-{:016x}", rand::thread_rng().gen::<u64>());
        tracing::debug!(job_id = %id, "mock job submitted");
        self.jobs
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                id.clone(),
                MockJob {
                    query: query.text().to_owned(),
                    max_results: query.max_results(),
                    polls: 0,
                },
            );
        Ok(JobHandle::new(id))
    }

    async fn poll_status(&self, handle: &JobHandle) -> Result<JobStatus, SearchError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let job = jobs
            .get_mut(handle.id())
            .ok_or_else(|| SearchError::Transport(format!("unknown job {handle}")))?;
        job.polls += 1;
        Ok(if job.polls >= self.polls_until_done {
            JobStatus::Done
        } else {
            JobStatus::Processing
        })
    }

    async fn fetch_results(&self, handle: JobHandle) -> Result<Vec<ResultItem>, SearchError> {
        let mut jobs = self.jobs.lock().unwrap_or_else(PoisonError::into_inner);
        let done = jobs
            .get(handle.id())
            .map(|job| job.polls >= self.polls_until_done)
            .ok_or_else(|| SearchError::Transport(format!("unknown job {handle}")))?;
        if !done {
            return Err(SearchError::Transport(format!("job {handle} is not done")));
        }
        let job = jobs
            .remove(handle.id())
            .ok_or_else(|| SearchError::Transport(format!("unknown job {handle}")))?;
        drop(jobs);
        Ok(mock_items(&job.query, job.max_results as usize))
    }

    fn name(&self) -> &'static str {
        "mock"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_items_count_ids_and_ranges() {
        let items = mock_items("rust", 5);
        assert_eq!(items.len(), 5);
        assert_eq!(items[0].id, "mock-tweet-1");
        assert_eq!(items[4].id, "mock-tweet-5");
        assert!(items[2].content.contains("rust"));
        for item in &items {
            let m = item.engagement_metrics;
            assert!(m.retweet_count < 100);
            assert!(m.like_count < 500);
            assert!(m.quote_count < 20);
            assert!(m.reply_count < 50);
            assert!(m.bookmark_count < 10);
            assert!(item.score.is_none());
        }
    }

    #[tokio::test]
    async fn lifecycle_submit_poll_fetch() {
        let client = MockJobClient::new(2);
        let query = SearchQuery::new("climate", Some(3)).expect("valid");
        let handle = client.submit(&query).await.expect("submit");
        assert!(handle.id().starts_with("mock-job-"));
        assert_eq!(client.in_flight(), 1);

        assert_eq!(client.poll_status(&handle).await.expect("poll"), JobStatus::Processing);
        assert_eq!(client.poll_status(&handle).await.expect("poll"), JobStatus::Done);

        let items = client.fetch_results(handle).await.expect("fetch");
        assert_eq!(items.len(), 3);
        assert!(items[0].content.contains("climate"));
        assert_eq!(client.in_flight(), 0);
    }

    #[tokio::test]
    async fn fetch_before_done_is_rejected_and_job_kept() {
        let client = MockJobClient::new(3);
        let query = SearchQuery::new("climate", None).expect("valid");
        let handle = client.submit(&query).await.expect("submit");
        let id = handle.id().to_owned();

        let err = client.fetch_results(handle).await.unwrap_err();
        assert!(err.to_string().contains("not done"));
        assert_eq!(client.in_flight(), 1);

        let status = client.poll_status(&JobHandle::new(id)).await.expect("poll");
        assert_eq!(status, JobStatus::Processing);
    }

    #[tokio::test]
    async fn unknown_job_is_transport_error() {
        let client = MockJobClient::default();
        let err = client
            .poll_status(&JobHandle::new("nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, SearchError::Transport(_)));
    }
}
