//! Storage interfaces used by the scanning pipeline.

use std::time::Duration;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;

use crate::persistence::error::PersistenceError;

/// Durable set of contract addresses that were already processed.
///
/// Addresses are compared case-insensitively; implementations normalize them
/// to lowercase before every lookup or write.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait SeenStore: Send + Sync {
    /// Returns whether the address has a seen record.
    async fn has(&self, address: &str) -> Result<bool, PersistenceError>;

    /// Records the address as seen. Returns `true` when a new record was
    /// created and `false` when the address was already present.
    async fn mark(&self, address: &str) -> Result<bool, PersistenceError>;

    /// Deletes records older than `retention` and returns how many were
    /// removed.
    async fn sweep(&self, retention: Duration) -> Result<u64, PersistenceError>;
}

/// Persistence of the poll loop cursor.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CursorStore: Send + Sync {
    /// Retrieves the last processed block number for a given network.
    async fn get_last_processed_block(
        &self,
        network_id: &str,
    ) -> Result<Option<u64>, PersistenceError>;

    /// Sets the last processed block number for a given network.
    async fn set_last_processed_block(
        &self,
        network_id: &str,
        block_number: u64,
    ) -> Result<(), PersistenceError>;
}
