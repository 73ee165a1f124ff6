//! Error types for the notification service.

use thiserror::Error;

/// Failure of a single delivery attempt.
#[derive(Debug, Error)]
pub enum NotificationError {
    /// The attempt may succeed if repeated: timeouts, connection errors,
    /// 5xx and 429 responses.
    #[error("Transient delivery failure: {0}")]
    Transient(String),

    /// The channel refused the message; repeating it will not help.
    #[error("Delivery rejected: {0}")]
    Rejected(String),

    /// The payload could not be encoded for the channel.
    #[error("Failed to encode notification: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl NotificationError {
    /// Whether another attempt may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, NotificationError::Transient(_))
    }
}

/// Outcome of [`NotificationSender::send`](super::NotificationSender::send)
/// when no attempt succeeded.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Every allowed attempt failed transiently.
    #[error("Delivery failed after {attempts} attempts: {source}")]
    Exhausted {
        /// Number of attempts made.
        attempts: u32,
        /// Error of the last attempt.
        source: NotificationError,
    },

    /// The channel rejected the message permanently.
    #[error("Delivery rejected after {attempts} attempts: {source}")]
    Rejected {
        /// Number of attempts made.
        attempts: u32,
        /// The rejection.
        source: NotificationError,
    },
}

impl DeliveryError {
    /// Number of attempts made before giving up.
    pub fn attempts(&self) -> u32 {
        match self {
            DeliveryError::Exhausted { attempts, .. } | DeliveryError::Rejected { attempts, .. } => {
                *attempts
            }
        }
    }
}
