//! # Notification delivery
//!
//! [`NotificationSender`] pushes rendered alerts to a [`NotificationChannel`]
//! while enforcing two independent constraints:
//!
//! - a sliding-window rate limit ([`rate_limiter::RateLimiter`]). Every
//!   attempt, retries included, takes one slot and callers wait for a slot
//!   instead of dropping messages;
//! - a bounded retry budget ([`retry::RetryPolicy`]) with exponential backoff
//!   for transient failures. Rejections are not retried.
//!
//! Channels perform exactly one attempt per call. [`telegram::TelegramChannel`]
//! talks to the Bot API and [`stdout::StdoutChannel`] prints payloads for dry
//! runs.

use std::sync::Arc;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

pub mod error;
pub mod rate_limiter;
pub mod retry;
pub mod stdout;
pub mod telegram;

use error::{DeliveryError, NotificationError};
use rate_limiter::RateLimiter;
use retry::RetryPolicy;

use crate::models::AlertPayload;

/// A destination able to display an alert.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait NotificationChannel: Send + Sync {
    /// Performs a single delivery attempt.
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), NotificationError>;
}

/// Rate-limited, retrying front of a [`NotificationChannel`].
pub struct NotificationSender {
    channel: Arc<dyn NotificationChannel>,
    limiter: Arc<RateLimiter>,
    retry: RetryPolicy,
}

impl NotificationSender {
    /// Creates a new sender.
    pub fn new(
        channel: Arc<dyn NotificationChannel>,
        limiter: Arc<RateLimiter>,
        retry: RetryPolicy,
    ) -> Self {
        Self { channel, limiter, retry }
    }

    /// Delivers `payload`, waiting for rate-limit slots and retrying transient
    /// failures. Fails once the retry budget is spent or the channel rejects
    /// the message.
    pub async fn send(&self, payload: &AlertPayload) -> Result<(), DeliveryError> {
        let mut attempts = 0;
        loop {
            attempts += 1;
            self.limiter.acquire().await;

            let error = match self.channel.deliver(payload).await {
                Ok(()) => {
                    tracing::debug!(attempts, "Notification delivered.");
                    return Ok(());
                }
                Err(e) => e,
            };

            if !error.is_transient() {
                tracing::error!(error = %error, attempts, "Notification rejected by channel.");
                return Err(DeliveryError::Rejected { attempts, source: error });
            }

            match self.retry.next_delay(attempts) {
                Some(delay) => {
                    tracing::warn!(
                        error = %error,
                        attempt = attempts,
                        max_attempts = self.retry.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        "Notification attempt failed, retrying."
                    );
                    tokio::time::sleep(delay).await;
                }
                None => {
                    tracing::error!(error = %error, attempts, "Notification retries exhausted.");
                    return Err(DeliveryError::Exhausted { attempts, source: error });
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{
            Mutex,
            atomic::{AtomicU32, Ordering},
        },
        time::Duration,
    };

    use tokio::time::Instant;

    use super::*;
    use crate::config::{HttpRetryConfig, JitterSetting};

    fn retry(max_attempts: u32) -> RetryPolicy {
        RetryPolicy::from_config(&HttpRetryConfig {
            max_retries: max_attempts,
            base_for_backoff: 2,
            initial_backoff_ms: Duration::from_millis(10),
            max_backoff_secs: Duration::from_millis(100),
            jitter: JitterSetting::None,
        })
    }

    fn sender(channel: impl NotificationChannel + 'static, limit: u32, attempts: u32) -> NotificationSender {
        NotificationSender::new(
            Arc::new(channel),
            Arc::new(RateLimiter::per_minute(limit)),
            retry(attempts),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_success_first_attempt() {
        let mut channel = MockNotificationChannel::new();
        channel.expect_deliver().times(1).returning(|_| Ok(()));

        let sender = sender(channel, 20, 3);
        assert!(sender.send(&AlertPayload::text("hi")).await.is_ok());
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_retries_transient_then_succeeds() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut channel = MockNotificationChannel::new();
        let counter = calls.clone();
        channel.expect_deliver().times(2).returning(move |_| {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(NotificationError::Transient("timeout".into()))
            } else {
                Ok(())
            }
        });

        let sender = sender(channel, 20, 3);
        assert!(sender.send(&AlertPayload::text("hi")).await.is_ok());
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_fails_after_exactly_max_attempts() {
        let mut channel = MockNotificationChannel::new();
        channel
            .expect_deliver()
            .times(4)
            .returning(|_| Err(NotificationError::Transient("503".into())));

        let sender = sender(channel, 20, 4);
        let err = sender.send(&AlertPayload::text("hi")).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Exhausted { attempts: 4, .. }));
        assert_eq!(err.attempts(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_send_does_not_retry_rejections() {
        let mut channel = MockNotificationChannel::new();
        channel
            .expect_deliver()
            .times(1)
            .returning(|_| Err(NotificationError::Rejected("chat not found".into())));

        let sender = sender(channel, 20, 5);
        let err = sender.send(&AlertPayload::text("hi")).await.unwrap_err();

        assert!(matches!(err, DeliveryError::Rejected { attempts: 1, .. }));
    }

    struct RecordingChannel {
        attempts: Mutex<Vec<Instant>>,
        fail_first: u32,
    }

    #[async_trait]
    impl NotificationChannel for RecordingChannel {
        async fn deliver(&self, _payload: &AlertPayload) -> Result<(), NotificationError> {
            let mut attempts = self.attempts.lock().unwrap();
            attempts.push(Instant::now());
            if attempts.len() as u32 <= self.fail_first {
                Err(NotificationError::Transient("flaky".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_every_attempt_respects_the_rate_limit() {
        let channel = Arc::new(RecordingChannel { attempts: Mutex::new(Vec::new()), fail_first: 7 });
        let sender = NotificationSender::new(
            channel.clone(),
            Arc::new(RateLimiter::per_minute(5)),
            retry(3),
        );

        for _ in 0..12 {
            let _ = sender.send(&AlertPayload::text("hi")).await;
        }

        let attempts = channel.attempts.lock().unwrap().clone();
        assert!(attempts.len() > 12, "retries should add attempts");
        for window in attempts.windows(6) {
            assert!(window[5].duration_since(window[0]) >= Duration::from_secs(60));
        }
    }
}
