//! Mocked alloy providers answering from an [`Asserter`] queue.

use alloy::{
    providers::{Provider, ProviderBuilder},
    transports::mock::Asserter,
};

use crate::providers::rpc::EvmRpcSource;

/// A provider whose responses are pushed onto the returned asserter.
pub fn mock_provider() -> (impl Provider + Send + Sync, Asserter) {
    let asserter = Asserter::new();
    let provider = ProviderBuilder::new().connect_mocked_client(asserter.clone());
    (provider, asserter)
}

/// An [`EvmRpcSource`] over [`mock_provider`].
pub fn mock_rpc_source() -> (EvmRpcSource<impl Provider + Send + Sync>, Asserter) {
    let (provider, asserter) = mock_provider();
    (EvmRpcSource::new(provider), asserter)
}
