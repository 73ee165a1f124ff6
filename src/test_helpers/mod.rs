//! A set of helpers for testing

mod block;
mod provider;
mod receipt;
mod transaction;

pub use block::BlockBuilder;
pub use provider::{mock_provider, mock_rpc_source};
pub use receipt::ReceiptBuilder;
pub use transaction::TransactionBuilder;
