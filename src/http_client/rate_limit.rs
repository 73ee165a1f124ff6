//! Middleware that takes a [`RateLimiter`] slot before every request attempt.

use std::sync::Arc;

use async_trait::async_trait;
use http::Extensions;
use reqwest::{Request, Response};
use reqwest_middleware::{Middleware, Next, Result};

use crate::notification::rate_limiter::RateLimiter;

/// Waits on a shared [`RateLimiter`] before passing a request on.
///
/// Layered inside the retry middleware, so each retry is one more attempt
/// against the budget.
pub struct RateLimitMiddleware {
    limiter: Arc<RateLimiter>,
}

impl RateLimitMiddleware {
    /// Creates the middleware over `limiter`.
    pub fn new(limiter: Arc<RateLimiter>) -> Self {
        Self { limiter }
    }
}

#[async_trait]
impl Middleware for RateLimitMiddleware {
    async fn handle(
        &self,
        req: Request,
        extensions: &mut Extensions,
        next: Next<'_>,
    ) -> Result<Response> {
        self.limiter.acquire().await;
        next.run(req, extensions).await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use reqwest_middleware::ClientBuilder;
    use tokio::time::Instant;

    use super::*;

    #[tokio::test]
    async fn test_requests_wait_for_a_slot() {
        let mut server = mockito::Server::new_async().await;
        let mock = server.mock("GET", "/").with_status(200).expect(2).create_async().await;

        let limiter = Arc::new(RateLimiter::new(1, Duration::from_millis(200)));
        let client = ClientBuilder::new(reqwest::Client::new())
            .with(RateLimitMiddleware::new(limiter))
            .build();

        let start = Instant::now();
        client.get(server.url()).send().await.unwrap();
        client.get(server.url()).send().await.unwrap();

        assert!(start.elapsed() >= Duration::from_millis(200));
        mock.assert_async().await;
    }
}
