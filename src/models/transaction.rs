//! EVM transaction data structures.

use alloy::{
    consensus::Transaction as ConsensusTransaction,
    primitives::{Address, B256},
    rpc::types::Transaction as AlloyTransaction,
};
use serde::{Deserialize, Serialize};

/// A newtype wrapper around `alloy::rpc::types::Transaction` to create a stable
/// API boundary for the rest of the application.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction(pub AlloyTransaction);

impl Transaction {
    /// Returns the transaction hash.
    pub fn hash(&self) -> B256 {
        *self.0.inner.hash()
    }

    /// Returns the recipient address, or `None` if it is a contract creation.
    pub fn to(&self) -> Option<Address> {
        self.0.inner.to()
    }

    /// Returns the sender address.
    pub fn sender(&self) -> Address {
        self.0.inner.signer()
    }

    /// Returns `true` if the transaction has no destination, i.e. it deploys a
    /// contract.
    pub fn is_contract_creation(&self) -> bool {
        self.to().is_none()
    }
}

/// The conversion from the alloy type to our custom type is a zero-cost move.
impl From<AlloyTransaction> for Transaction {
    fn from(tx: AlloyTransaction) -> Self {
        Self(tx)
    }
}
