//! A builder for creating `Transaction` instances for testing.

use alloy::{
    primitives::{Address, B256},
    rpc::types::Transaction as AlloyTransaction,
};

use crate::models::transaction::Transaction;

const DEFAULT_HASH: &str = "0xe9e91f1ee4b56c0df2e9f06c2b8c27c6076195a88a7b8537ba8313d80e6f124e";

/// A builder for creating `Transaction` instances for testing.
///
/// Without a `to` address the built transaction is a contract creation.
#[derive(Debug, Clone, Default)]
pub struct TransactionBuilder {
    hash: Option<B256>,
    to: Option<Address>,
    from: Option<Address>,
}

impl TransactionBuilder {
    /// Creates a new `TransactionBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transaction hash.
    pub fn hash(mut self, hash: B256) -> Self {
        self.hash = Some(hash);
        self
    }

    /// Sets the `to` address; `None` makes a contract creation.
    pub fn to(mut self, to: Option<Address>) -> Self {
        self.to = to;
        self
    }

    /// Sets the `from` address for the transaction.
    pub fn from(mut self, from: Address) -> Self {
        self.from = Some(from);
        self
    }

    /// Builds the `Transaction` by deserializing its RPC JSON form.
    pub fn build(self) -> Transaction {
        let hash = self.hash.map(|h| format!("0x{h:x}")).unwrap_or_else(|| DEFAULT_HASH.into());
        let to_field = match self.to {
            Some(addr) => format!("\"0x{addr:x}\""),
            None => "null".to_string(),
        };

        let tx_json = format!(
            r#"{{
                "blockHash": "0x8e38b4dbf6b11fcc3b9dee84fb7986e29ca0a02cecd8977c161ff7333329681e",
                "blockNumber": "0x1",
                "hash": "{hash}",
                "transactionIndex": "0x0",
                "type": "0x2",
                "nonce": "0x0",
                "input": "0x",
                "maxFeePerGas": "0x77359400",
                "maxPriorityFeePerGas": "0x3b9aca00",
                "chainId": "0x1",
                "accessList": [],
                "gas": "0x5208",
                "from": "0x{from:x}",
                "to": {to_field},
                "value": "0x0",
                "r": "0x1",
                "s": "0x1",
                "v": "0x1"
            }}"#,
            from = self.from.unwrap_or_default(),
        );

        let alloy_tx: AlloyTransaction =
            serde_json::from_str(&tx_json).expect("Failed to create transaction from JSON");
        Transaction(alloy_tx)
    }
}
