//! Construction of HTTP clients that retry transient failures (connection
//! errors, timeouts, 5xx and 429 responses) with exponential backoff.

use std::sync::Arc;

use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{Jitter, RetryTransientMiddleware, policies::ExponentialBackoff};

use super::rate_limit::RateLimitMiddleware;
use crate::{
    config::{HttpRetryConfig, JitterSetting},
    notification::rate_limiter::RateLimiter,
};

/// Builds the backoff policy described by `config`.
///
/// `config.max_retries` counts every attempt, so the policy allows one retry
/// less than that.
pub fn build_backoff_policy(config: &HttpRetryConfig) -> ExponentialBackoff {
    let jitter = match config.jitter {
        JitterSetting::None => Jitter::None,
        JitterSetting::Full => Jitter::Full,
    };

    ExponentialBackoff::builder()
        .jitter(jitter)
        .base(config.base_for_backoff)
        .retry_bounds(config.initial_backoff_ms, config.max_backoff_secs)
        .build_with_max_retries(config.retries_after_first_attempt())
}

/// Wraps `base_client` with a transient-error retry middleware. Every attempt,
/// retries included, first takes a slot from `limiter`.
pub fn create_retryable_http_client(
    config: &HttpRetryConfig,
    base_client: reqwest::Client,
    limiter: Arc<RateLimiter>,
) -> ClientWithMiddleware {
    ClientBuilder::new(base_client)
        .with(RetryTransientMiddleware::new_with_policy(build_backoff_policy(config)))
        .with(RateLimitMiddleware::new(limiter))
        .build()
}
