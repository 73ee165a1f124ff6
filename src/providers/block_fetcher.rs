//! This module contains the `BlockFetcher` component, responsible for
//! retrieving blocks and receipts from an EVM RPC endpoint.

use alloy::{
    primitives::TxHash,
    providers::Provider,
    rpc::types::{Block, TransactionReceipt},
};
use thiserror::Error;

/// Custom error type for the `BlockFetcher`.
#[derive(Error, Debug)]
pub enum BlockFetcherError {
    /// Error when interacting with the RPC provider.
    #[error("Provider error: {0}")]
    Provider(#[from] Box<dyn std::error::Error + Send + Sync>),
    /// Indicates that the requested block was not found.
    #[error("Block not found: {0}")]
    BlockNotFound(u64),
}

/// A component responsible for fetching block data.
pub struct BlockFetcher<P> {
    /// The RPC provider used to fetch block data.
    provider: P,
}

impl<P> BlockFetcher<P>
where
    P: Provider + Send + Sync,
{
    /// Creates a new `BlockFetcher`.
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetches a block together with its full transaction bodies.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_block(&self, number: u64) -> Result<Block, BlockFetcherError> {
        self.provider
            .get_block_by_number(number.into())
            .full()
            .await
            .map_err(|e| BlockFetcherError::Provider(Box::new(e)))?
            .ok_or(BlockFetcherError::BlockNotFound(number))
    }

    /// Fetches the receipt of a single transaction.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn fetch_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, BlockFetcherError> {
        self.provider
            .get_transaction_receipt(tx_hash)
            .await
            .map_err(|e| BlockFetcherError::Provider(Box::new(e)))
    }

    /// Fetches the current block number from the data source.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn get_current_block_number(&self) -> Result<u64, BlockFetcherError> {
        self.provider.get_block_number().await.map_err(|e| BlockFetcherError::Provider(Box::new(e)))
    }
}
