//! Access to the watched chain.

pub mod block_fetcher;
pub mod rpc;
pub mod traits;
