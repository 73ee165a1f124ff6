//! This module provides functionality to create a provider for EVM RPC requests
//! with retry logic and backoff strategies.

use std::time::Duration;

use alloy::{
    primitives::TxHash,
    providers::{Provider, ProviderBuilder},
    rpc::{
        client::RpcClient,
        types::{Block, TransactionReceipt},
    },
    transports::{
        http::{Http, reqwest::Url},
        layers::RetryBackoffLayer,
    },
};
use async_trait::async_trait;
use tower::ServiceBuilder;

use super::{
    block_fetcher::{BlockFetcher, BlockFetcherError},
    traits::{DataSource, DataSourceError},
};
use crate::config::RpcRetryConfig;

/// A `DataSource` implementation that fetches data from an EVM RPC endpoint.
pub struct EvmRpcSource<P> {
    block_fetcher: BlockFetcher<P>,
}

impl<P> EvmRpcSource<P>
where
    P: Provider + Send + Sync,
{
    /// Creates a new `EvmRpcSource`.
    #[tracing::instrument(skip(provider), level = "debug")]
    pub fn new(provider: P) -> Self {
        Self { block_fetcher: BlockFetcher::new(provider) }
    }
}

#[async_trait]
impl<P> DataSource for EvmRpcSource<P>
where
    P: Provider + Send + Sync,
{
    #[tracing::instrument(skip(self), level = "debug")]
    async fn get_current_block_number(&self) -> Result<u64, DataSourceError> {
        tracing::debug!("Fetching current block number from RPC.");
        let block_number = self
            .block_fetcher
            .get_current_block_number()
            .await
            .map_err(Into::<DataSourceError>::into)?;
        tracing::debug!(current_block = block_number, "Successfully fetched current block number.");
        Ok(block_number)
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_block(&self, block_number: u64) -> Result<Block, DataSourceError> {
        match self.block_fetcher.fetch_block(block_number).await {
            Ok(block) => {
                tracing::debug!(block_number, "Successfully fetched block.");
                Ok(block)
            }
            Err(BlockFetcherError::BlockNotFound(num)) => {
                tracing::warn!(block_number = num, "Block not found.");
                Err(DataSourceError::BlockNotFound(num))
            }
            Err(e) => {
                tracing::error!(error = %e, block_number, "Failed to fetch block.");
                Err(DataSourceError::BlockFetcher(e))
            }
        }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_receipt(
        &self,
        tx_hash: TxHash,
    ) -> Result<Option<TransactionReceipt>, DataSourceError> {
        Ok(self.block_fetcher.fetch_receipt(tx_hash).await?)
    }
}

/// Custom error type for provider operations.
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// Error when creating the provider.
    #[error("Provider creation failed: {0}")]
    CreationError(String),
}

/// Creates a provider for `url` whose HTTP transport applies `request_timeout`
/// to every call and retries rate-limited or failed requests.
pub fn create_provider(
    url: Url,
    retry_config: RpcRetryConfig,
    request_timeout: Duration,
) -> Result<impl Provider, ProviderError> {
    let client = alloy::transports::http::reqwest::Client::builder()
        .timeout(request_timeout)
        .build()
        .map_err(|e| ProviderError::CreationError(e.to_string()))?;
    let transport = Http::with_client(client, url);

    let retry_layer = RetryBackoffLayer::new(
        retry_config.max_retry,
        retry_config.backoff_ms,
        retry_config.compute_units_per_second,
    );

    let service = ServiceBuilder::new().layer(retry_layer).service(transport);

    let client = RpcClient::builder().transport(service, false);
    let provider = ProviderBuilder::new().connect_client(client);
    Ok(provider)
}
