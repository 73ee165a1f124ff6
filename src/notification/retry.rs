//! Retry schedule for notification delivery.

use std::time::{Duration, SystemTime};

use reqwest_retry::{RetryDecision, RetryPolicy as _, policies::ExponentialBackoff};

use crate::{config::HttpRetryConfig, http_client::build_backoff_policy};

/// Exponential backoff bounded by a total number of attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff: ExponentialBackoff,
}

impl RetryPolicy {
    /// Builds the policy from the shared HTTP retry settings.
    pub fn from_config(config: &HttpRetryConfig) -> Self {
        Self { max_attempts: config.max_retries.max(1), backoff: build_backoff_policy(config) }
    }

    /// Total number of attempts, the first one included.
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before the next attempt once `failed_attempts` attempts failed,
    /// or `None` when the budget is spent.
    pub fn next_delay(&self, failed_attempts: u32) -> Option<Duration> {
        if failed_attempts == 0 || failed_attempts >= self.max_attempts {
            return None;
        }
        let now = SystemTime::now();
        match self.backoff.should_retry(now, failed_attempts - 1) {
            RetryDecision::Retry { execute_after } => {
                Some(execute_after.duration_since(now).unwrap_or_default())
            }
            RetryDecision::DoNotRetry => None,
        }
    }
}
