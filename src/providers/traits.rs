//! The read-only view of the chain used by the poll loop and the block
//! scanner: head height, full blocks and receipts.

use alloy::{
    primitives::TxHash,
    rpc::types::{Block, TransactionReceipt},
};
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use thiserror::Error;

use super::block_fetcher::BlockFetcherError;

/// Failures of a chain read. All of them are transient from the scanner's
/// point of view.
#[derive(Error, Debug)]
pub enum DataSourceError {
    /// The RPC call failed after the transport's own retries.
    #[error("Block fetcher error: {0}")]
    BlockFetcher(#[from] BlockFetcherError),

    /// Indicates that the requested block was not found.
    #[error("Block not found: {0}")]
    BlockNotFound(u64),
}

/// Source of chain data.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Fetches the current block number from the data source.
    async fn get_current_block_number(&self) -> Result<u64, DataSourceError>;

    /// Fetches a block with full transaction bodies.
    async fn fetch_block(&self, block_number: u64) -> Result<Block, DataSourceError>;

    /// Fetches the receipt of a transaction, `None` if the node does not know
    /// it.
    async fn fetch_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, DataSourceError>;
}
