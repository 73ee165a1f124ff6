//! A channel that prints alerts instead of sending them.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{NotificationChannel, error::NotificationError};
use crate::models::AlertPayload;

/// Writes every payload to standard output as JSON.
#[derive(Debug, Default)]
pub struct StdoutChannel {
    delivered: AtomicUsize,
}

impl StdoutChannel {
    /// Creates a new `StdoutChannel`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of payloads printed so far.
    pub fn delivered(&self) -> usize {
        self.delivered.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl NotificationChannel for StdoutChannel {
    async fn deliver(&self, payload: &AlertPayload) -> Result<(), NotificationError> {
        let rendered = serde_json::to_string_pretty(payload)?;
        println!("{rendered}");
        self.delivered.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
