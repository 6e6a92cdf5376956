//! Search orchestrator: job lifecycle, backoff, engagement ranking.
//!
//! This module drives a submitted job to completion with exponential
//! backoff under a hard deadline, then ranks the retrieved items by a
//! weighted engagement score.

pub mod backoff;
pub mod polling;
pub mod scoring;

pub use polling::{PollingOrchestrator, RunState};
