//! A contract deployment found while scanning a block.

use alloy::primitives::{Address, TxHash};

/// Lowercase hex form of an address, used as the seen-set key.
pub fn normalize_address(address: &Address) -> String {
    address.to_string().to_lowercase()
}

/// A freshly deployed contract waiting for verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractCandidate {
    /// Address of the created contract, taken from the receipt.
    pub address: Address,
    /// Sender of the creation transaction.
    pub deployer: Address,
    /// Height of the block containing the deployment.
    pub block_number: u64,
    /// Block timestamp, unix seconds UTC.
    pub block_timestamp: u64,
    /// Hash of the creation transaction.
    pub tx_hash: TxHash,
}

impl ContractCandidate {
    /// The seen-set key of this candidate.
    pub fn key(&self) -> String {
        normalize_address(&self.address)
    }
}
