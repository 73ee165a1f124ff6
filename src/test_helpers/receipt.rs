//! A builder for creating `TransactionReceipt` instances for testing.

use alloy::{
    consensus::{ReceiptEnvelope, ReceiptWithBloom},
    primitives::{Address, B256},
    rpc::types::TransactionReceipt,
};

/// A builder for creating `TransactionReceipt` instances for testing.
#[derive(Debug, Default, Clone)]
pub struct ReceiptBuilder {
    transaction_hash: Option<B256>,
    contract_address: Option<Address>,
}

impl ReceiptBuilder {
    /// Creates a new `ReceiptBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the transaction hash for the receipt.
    pub fn transaction_hash(mut self, hash: B256) -> Self {
        self.transaction_hash = Some(hash);
        self
    }

    /// Sets the address of the contract created by the transaction.
    pub fn contract_address(mut self, address: Address) -> Self {
        self.contract_address = Some(address);
        self
    }

    /// Builds the `TransactionReceipt` with the provided or default values.
    pub fn build(self) -> TransactionReceipt {
        TransactionReceipt {
            transaction_hash: self.transaction_hash.unwrap_or_default(),
            block_number: Some(123),
            transaction_index: Some(1),
            block_hash: Some(B256::default()),
            from: Address::default(),
            // Creation receipts have no recipient.
            to: if self.contract_address.is_some() { None } else { Some(Address::default()) },
            gas_used: 21_000,
            contract_address: self.contract_address,
            effective_gas_price: 1_000_000_000, // 1 Gwei
            blob_gas_used: None,
            blob_gas_price: None,
            inner: ReceiptEnvelope::Eip7702(ReceiptWithBloom::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use alloy::primitives::{address, b256};

    use super::*;

    #[test]
    fn test_receipt_builder_defaults() {
        let receipt = ReceiptBuilder::new()
            .transaction_hash(b256!(
                "0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef"
            ))
            .build();

        assert_eq!(
            receipt.transaction_hash,
            b256!("0x1234567890abcdef1234567890abcdef1234567890abcdef1234567890abcdef")
        );
        assert_eq!(receipt.to, Some(Address::default()));
        assert!(receipt.contract_address.is_none());
    }

    #[test]
    fn test_receipt_builder_creation() {
        let created = address!("5FbDB2315678afecb367f032d93F642f64180aa3");
        let receipt = ReceiptBuilder::new().contract_address(created).build();

        assert_eq!(receipt.contract_address, Some(created));
        assert_eq!(receipt.to, None);
    }
}
