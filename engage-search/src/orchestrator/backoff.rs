//! Backoff and deadline arithmetic for the polling loop.
//!
//! Pure functions, independent of the timer used to wait.
//!
//! Formula: `wait(attempt) = min(base * 1.5^(attempt - 1), max)`

use std::time::Duration;

use crate::config::PollConfig;

/// Growth factor applied to the wait after each non-terminal poll.
pub const BACKOFF_FACTOR: f64 = 1.5;

/// Largest exponent evaluated; beyond this the ceiling always applies.
const MAX_EXPONENT: u32 = 64;

/// Wait to apply after poll number `attempt` (1-based) before polling again.
///
/// - Attempt 1 waits `base_interval`
/// - Each further attempt multiplies by [`BACKOFF_FACTOR`]
/// - Never exceeds `max_interval`
pub fn backoff_delay(config: &PollConfig, attempt: u32) -> Duration {
    let exponent = attempt.saturating_sub(1).min(MAX_EXPONENT);
    let raw = config.base_interval.as_secs_f64() * BACKOFF_FACTOR.powi(exponent as i32);
    let ceiling = config.max_interval.as_secs_f64();
    Duration::from_secs_f64(raw.min(ceiling))
}

/// Time left before `timeout`, or `None` once the deadline has passed.
pub fn remaining(timeout: Duration, elapsed: Duration) -> Option<Duration> {
    timeout.checked_sub(elapsed).filter(|left| !left.is_zero())
}

/// The wait actually slept: the backoff delay, clipped to the time left.
pub fn next_wait(config: &PollConfig, attempt: u32, elapsed: Duration) -> Duration {
    let delay = backoff_delay(config, attempt);
    remaining(config.timeout, elapsed).map_or(Duration::ZERO, |left| delay.min(left))
}
