//! Detection of verified contract deployments in a single block.

use std::sync::Arc;

use alloy::rpc::types::Block;
use async_trait::async_trait;
use futures::{StreamExt, stream};
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

use crate::{
    alert::AlertFormatter,
    explorer::VerificationGate,
    models::{ContractCandidate, transaction::Transaction},
    notification::NotificationSender,
    persistence::{error::PersistenceError, traits::SeenStore},
    providers::traits::{DataSource, DataSourceError},
};

/// Errors that abort the scan of a block.
#[derive(Debug, Error)]
pub enum ScanError {
    /// The block could not be fetched.
    #[error("Failed to fetch block: {0}")]
    DataSource(#[from] DataSourceError),

    /// The seen store failed; continuing could produce duplicate alerts.
    #[error("Seen store failure: {0}")]
    Storage(#[from] PersistenceError),
}

/// Counters describing what a scan did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScanSummary {
    /// Height of the scanned block.
    pub block_number: u64,
    /// Transactions without a recipient.
    pub creations: usize,
    /// Creations whose receipt could not be used.
    pub skipped_receipts: usize,
    /// Addresses already present in the seen store.
    pub already_seen: usize,
    /// New addresses that turned out to be unverified.
    pub unverified: usize,
    /// Alerts delivered.
    pub alerted: usize,
    /// Alerts whose delivery failed.
    pub delivery_failures: usize,
}

/// Something that can process a block height.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait BlockScan: Send + Sync {
    /// Processes every contract deployment of `block_number`.
    async fn scan(&self, block_number: u64) -> Result<ScanSummary, ScanError>;
}

/// Finds contract creations in a block and alerts on the verified ones.
///
/// Verification lookups may run concurrently (`verification_concurrency`),
/// but marking and sending happen one candidate at a time, in transaction
/// order.
pub struct BlockScanner<D: ?Sized, G: ?Sized, S: ?Sized> {
    data_source: Arc<D>,
    gate: Arc<G>,
    store: Arc<S>,
    formatter: AlertFormatter,
    sender: Arc<NotificationSender>,
    verification_concurrency: usize,
}

impl<D, G, S> BlockScanner<D, G, S>
where
    D: DataSource + ?Sized,
    G: VerificationGate + ?Sized,
    S: SeenStore + ?Sized,
{
    /// Creates a new `BlockScanner`.
    pub fn new(
        data_source: Arc<D>,
        gate: Arc<G>,
        store: Arc<S>,
        formatter: AlertFormatter,
        sender: Arc<NotificationSender>,
        verification_concurrency: usize,
    ) -> Self {
        Self {
            data_source,
            gate,
            store,
            formatter,
            sender,
            verification_concurrency: verification_concurrency.max(1),
        }
    }

    /// Resolves the creation transactions of `block` into unseen candidates.
    async fn collect_candidates(
        &self,
        block: &Block,
        summary: &mut ScanSummary,
    ) -> Result<Vec<ContractCandidate>, ScanError> {
        let block_number = block.header.number;
        let creations: Vec<Transaction> = block
            .transactions
            .txns()
            .cloned()
            .map(Transaction::from)
            .filter(Transaction::is_contract_creation)
            .collect();
        summary.creations = creations.len();

        let mut candidates = Vec::with_capacity(creations.len());
        for tx in creations {
            let tx_hash = tx.hash();
            let receipt = match self.data_source.fetch_receipt(tx_hash).await {
                Ok(Some(receipt)) => receipt,
                Ok(None) => {
                    tracing::warn!(block_number, %tx_hash, "Receipt not found, skipping transaction.");
                    summary.skipped_receipts += 1;
                    continue;
                }
                Err(e) => {
                    tracing::warn!(block_number, %tx_hash, error = %e, "Failed to fetch receipt, skipping transaction.");
                    summary.skipped_receipts += 1;
                    continue;
                }
            };

            let Some(address) = receipt.contract_address.filter(|a| !a.is_zero()) else {
                tracing::debug!(block_number, %tx_hash, "Receipt carries no contract address.");
                summary.skipped_receipts += 1;
                continue;
            };

            let candidate = ContractCandidate {
                address,
                deployer: tx.sender(),
                block_number,
                block_timestamp: block.header.timestamp,
                tx_hash,
            };

            if self.store.has(&candidate.key()).await? {
                tracing::debug!(block_number, %address, "Contract already seen.");
                summary.already_seen += 1;
                continue;
            }

            candidates.push(candidate);
        }

        Ok(candidates)
    }
}

#[async_trait]
impl<D, G, S> BlockScan for BlockScanner<D, G, S>
where
    D: DataSource + ?Sized,
    G: VerificationGate + ?Sized,
    S: SeenStore + ?Sized,
{
    #[tracing::instrument(skip(self), level = "debug")]
    async fn scan(&self, block_number: u64) -> Result<ScanSummary, ScanError> {
        let block = self.data_source.fetch_block(block_number).await?;
        let mut summary = ScanSummary { block_number, ..Default::default() };

        let candidates = self.collect_candidates(&block, &mut summary).await?;
        if candidates.is_empty() {
            return Ok(summary);
        }

        let gate = &self.gate;
        let mut resolved = stream::iter(candidates)
            .map(|candidate| async move {
                let record = gate.check(&candidate.address).await;
                // Metadata is only worth fetching for contracts that will be alerted.
                let metadata =
                    if record.verified { Some(gate.fetch_metadata(&candidate.address).await) } else { None };
                (candidate, record, metadata)
            })
            .buffered(self.verification_concurrency);

        while let Some((candidate, record, metadata)) = resolved.next().await {
            let key = candidate.key();

            if !record.verified {
                tracing::debug!(block_number, address = %candidate.address, "Contract is not verified.");
                self.store.mark(&key).await?;
                summary.unverified += 1;
                continue;
            }

            let payload =
                self.formatter.format(&candidate, &record, &metadata.unwrap_or_default());
            match self.sender.send(&payload).await {
                Ok(()) => {
                    tracing::info!(
                        block_number,
                        address = %candidate.address,
                        contract_name = ?record.contract_name,
                        "Alert sent for verified contract."
                    );
                    summary.alerted += 1;
                }
                Err(e) => {
                    tracing::error!(
                        block_number,
                        address = %candidate.address,
                        error = %e,
                        "Failed to deliver alert, marking contract as seen anyway."
                    );
                    summary.delivery_failures += 1;
                }
            }
            self.store.mark(&key).await?;
        }

        Ok(summary)
    }
}
