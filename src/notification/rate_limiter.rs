//! Sliding-window rate limiter for outbound calls.

use std::{collections::VecDeque, time::Duration};

use tokio::{sync::Mutex, time::Instant};

/// Allows at most `max_calls` acquisitions in any trailing `period`.
///
/// Callers that exceed the budget wait until the oldest acquisition leaves
/// the window; nothing is ever dropped.
#[derive(Debug)]
pub struct RateLimiter {
    max_calls: usize,
    period: Duration,
    calls: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter. A `max_calls` of zero is treated as one.
    pub fn new(max_calls: u32, period: Duration) -> Self {
        let max_calls = (max_calls as usize).max(1);
        Self { max_calls, period, calls: Mutex::new(VecDeque::new()) }
    }

    /// A limiter over a one-minute window.
    pub fn per_minute(max_calls: u32) -> Self {
        Self::new(max_calls, Duration::from_secs(60))
    }

    /// Waits for a free slot and takes it.
    pub async fn acquire(&self) {
        loop {
            let wait_until = {
                let mut calls = self.calls.lock().await;
                let now = Instant::now();
                while calls.front().is_some_and(|t| now.duration_since(*t) >= self.period) {
                    calls.pop_front();
                }
                if calls.len() < self.max_calls {
                    calls.push_back(now);
                    return;
                }
                calls.front().map(|oldest| *oldest + self.period)
            };

            if let Some(deadline) = wait_until {
                tracing::debug!(
                    wait_ms = deadline.saturating_duration_since(Instant::now()).as_millis() as u64,
                    "Rate limit reached, waiting for a free slot."
                );
                tokio::time::sleep_until(deadline).await;
            }
        }
    }
}
