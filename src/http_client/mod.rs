//! Retryable HTTP clients for the explorer transport.

mod client;
mod rate_limit;

pub use client::{build_backoff_policy, create_retryable_http_client};
pub use rate_limit::RateLimitMiddleware;
