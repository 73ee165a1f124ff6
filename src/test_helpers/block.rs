//! A builder for creating `Block` instances for testing.

use alloy::rpc::types::{Block, BlockTransactions, Header};

use crate::models::transaction::Transaction;

/// A builder for creating `Block` instances for testing.
#[derive(Debug, Clone, Default)]
pub struct BlockBuilder {
    header: Header,
    transactions: Vec<Transaction>,
}

impl BlockBuilder {
    /// Creates a new `BlockBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the block number.
    pub fn number(mut self, number: u64) -> Self {
        self.header.inner.number = number;
        self
    }

    /// Sets the block timestamp (unix seconds).
    pub fn timestamp(mut self, timestamp: u64) -> Self {
        self.header.inner.timestamp = timestamp;
        self
    }

    /// Adds a transaction to the block.
    pub fn transaction(mut self, tx: Transaction) -> Self {
        self.transactions.push(tx);
        self
    }

    /// Builds the `Block` with the provided values.
    pub fn build(self) -> Block {
        let txs = self.transactions.into_iter().map(|tx| tx.0).collect();
        Block {
            header: self.header,
            transactions: BlockTransactions::Full(txs),
            uncles: Default::default(),
            withdrawals: Default::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::b256;

    use super::*;
    use crate::test_helpers::TransactionBuilder;

    #[test]
    fn test_block_builder() {
        let tx_hash1 = b256!("1111111111111111111111111111111111111111111111111111111111111111");
        let tx_hash2 = b256!("2222222222222222222222222222222222222222222222222222222222222222");

        let block = BlockBuilder::new()
            .number(123)
            .timestamp(1_700_000_000)
            .transaction(TransactionBuilder::new().hash(tx_hash1).build())
            .transaction(TransactionBuilder::new().hash(tx_hash2).build())
            .build();

        assert_eq!(block.header.number, 123);
        assert_eq!(block.header.timestamp, 1_700_000_000);

        let BlockTransactions::Full(txs) = block.transactions else {
            panic!("Expected full transactions");
        };
        assert_eq!(txs.len(), 2);
        assert_eq!(*txs[0].inner.hash(), tx_hash1);
        assert_eq!(*txs[1].inner.hash(), tx_hash2);
    }

    #[test]
    fn test_block_builder_empty() {
        let block = BlockBuilder::new().build();
        assert_eq!(block.header.number, 0);
        assert!(matches!(block.transactions, BlockTransactions::Full(txs) if txs.is_empty()));
    }
}
