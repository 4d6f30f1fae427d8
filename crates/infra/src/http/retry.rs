//! Retry policy for HTTP transport failures
//!
//! Only failures where no response arrived (connect, timeout, request) are
//! retried. Any HTTP response, successful or not, ends the loop.

use std::time::Duration;

use fieldsync_domain::constants::{
    DEFAULT_RETRY_INITIAL_BACKOFF_MS, DEFAULT_RETRY_MAX_ATTEMPTS, DEFAULT_RETRY_MAX_BACKOFF_MS,
};
use fieldsync_domain::RetryConfig;

/// Exponential backoff with a ceiling: `initial * 2^(retry - 1)`, capped at
/// `max_backoff`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    initial_backoff: Duration,
    max_backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, initial_backoff: Duration, max_backoff: Duration) -> Self {
        Self { max_attempts: max_attempts.max(1), initial_backoff, max_backoff }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Total attempts including the first one
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let shift = retry.saturating_sub(1).min(16);
        self.initial_backoff.saturating_mul(1u32 << shift).min(self.max_backoff)
    }

    /// Whether a failed `attempt` (1-based) should be followed by another.
    pub fn should_retry(&self, err: &reqwest::Error, attempt: u32) -> bool {
        attempt < self.max_attempts && is_transient(err)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RETRY_MAX_ATTEMPTS,
            Duration::from_millis(DEFAULT_RETRY_INITIAL_BACKOFF_MS),
            Duration::from_millis(DEFAULT_RETRY_MAX_BACKOFF_MS),
        )
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.initial_backoff_ms),
            Duration::from_millis(config.max_backoff_ms),
        )
    }
}

/// Transport-level failure with no HTTP response.
pub fn is_transient(err: &reqwest::Error) -> bool {
    err.status().is_none() && (err.is_timeout() || err.is_connect() || err.is_request())
}
