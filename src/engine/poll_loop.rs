//! The PollLoop drives the scanner: it follows the chain head and hands every
//! new height to a [`BlockScan`] exactly once, in ascending order.

use std::sync::Arc;

use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::{
    config::{AppConfig, CursorMode},
    engine::block_scanner::BlockScan,
    persistence::{
        error::PersistenceError,
        traits::{CursorStore, SeenStore},
    },
    providers::traits::{DataSource, DataSourceError},
};

/// Lifecycle of the loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Sweeping the seen store and deriving the initial cursor.
    Starting,
    /// Scanning new heights.
    Polling,
    /// Waiting for the next poll.
    Sleeping,
    /// Startup failed; the loop will not run.
    Fatal,
}

/// Errors raised by the poll loop.
#[derive(Debug, Error)]
pub enum PollLoopError {
    /// The chain could not be queried.
    #[error("Data source error: {0}")]
    DataSource(#[from] DataSourceError),

    /// The seen or cursor store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] PersistenceError),

    /// `poll_once` was called before a successful `start`.
    #[error("Poll loop has not been started")]
    NotStarted,
}

/// Follows the chain head and scans every new height.
pub struct PollLoop<D: ?Sized, B: ?Sized, S: ?Sized> {
    config: Arc<AppConfig>,
    data_source: Arc<D>,
    scanner: Arc<B>,
    store: Arc<S>,
    cursor: Option<u64>,
    state: LoopState,
    cancellation_token: CancellationToken,
}

impl<D, B, S> PollLoop<D, B, S>
where
    D: DataSource + ?Sized,
    B: BlockScan + ?Sized,
    S: SeenStore + CursorStore + ?Sized,
{
    /// Creates a new `PollLoop` in the `Starting` state.
    pub fn new(
        config: Arc<AppConfig>,
        data_source: Arc<D>,
        scanner: Arc<B>,
        store: Arc<S>,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            config,
            data_source,
            scanner,
            store,
            cursor: None,
            state: LoopState::Starting,
            cancellation_token,
        }
    }

    /// The last fully processed height, once started.
    pub fn cursor(&self) -> Option<u64> {
        self.cursor
    }

    /// The current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.state
    }

    /// Sweeps expired seen records and derives the initial cursor.
    ///
    /// The returned height itself is never scanned. Any error here is a fatal
    /// startup failure and leaves the loop in [`LoopState::Fatal`].
    pub async fn start(&mut self) -> Result<u64, PollLoopError> {
        self.state = LoopState::Starting;
        match self.initial_cursor().await {
            Ok(cursor) => {
                tracing::info!(
                    cursor,
                    mode = ?self.config.cursor_mode,
                    network_id = %self.config.network_id,
                    "Poll loop started."
                );
                self.cursor = Some(cursor);
                self.state = LoopState::Polling;
                Ok(cursor)
            }
            Err(e) => {
                tracing::error!(error = %e, "Poll loop failed to start.");
                self.state = LoopState::Fatal;
                Err(e)
            }
        }
    }

    async fn initial_cursor(&self) -> Result<u64, PollLoopError> {
        let removed = self.store.sweep(self.config.retention).await?;
        tracing::info!(removed, "Startup retention sweep completed.");

        let head = self.data_source.get_current_block_number().await?;
        if self.config.cursor_mode == CursorMode::ChainHead {
            return Ok(head);
        }

        let network_id = &self.config.network_id;
        match self.store.get_last_processed_block(network_id).await? {
            Some(saved) if saved <= head => {
                tracing::info!(saved, head, "Resuming from persisted cursor.");
                Ok(saved)
            }
            Some(saved) => {
                tracing::warn!(saved, head, "Persisted cursor is ahead of the chain, starting from head.");
                self.store.set_last_processed_block(network_id, head).await?;
                Ok(head)
            }
            None => {
                self.store.set_last_processed_block(network_id, head).await?;
                Ok(head)
            }
        }
    }

    /// Scans every height in `(cursor, latest]` and returns how many were
    /// scanned. A failing height is logged and passed over.
    pub async fn poll_once(&mut self) -> Result<u64, PollLoopError> {
        let cursor = self.cursor.ok_or(PollLoopError::NotStarted)?;
        self.state = LoopState::Polling;

        let latest = self.data_source.get_current_block_number().await?;
        if latest <= cursor {
            tracing::debug!(cursor, latest, "No new blocks.");
            return Ok(0);
        }

        tracing::debug!(from_block = cursor + 1, to_block = latest, "Processing block range.");
        let mut scanned = 0;
        for height in cursor + 1..=latest {
            if self.cancellation_token.is_cancelled() {
                tracing::info!(height, "Cancellation requested, stopping block scan.");
                break;
            }

            match self.scanner.scan(height).await {
                Ok(summary) => tracing::debug!(?summary, "Block scanned."),
                Err(e) => tracing::error!(height, error = %e, "Failed to scan block, moving on."),
            }

            self.cursor = Some(height);
            scanned += 1;
            if self.config.cursor_mode == CursorMode::Resume {
                self.store.set_last_processed_block(&self.config.network_id, height).await?;
            }
        }

        Ok(scanned)
    }

    /// Starts the long-running service loop. Requires a successful
    /// [`start`](Self::start).
    pub async fn run(mut self) {
        loop {
            if self.cancellation_token.is_cancelled() {
                break;
            }

            if let Err(e) = self.poll_once().await {
                tracing::error!(error = %e, "Error during poll cycle. Retrying after delay...");
            }

            self.state = LoopState::Sleeping;
            tokio::select! {
                biased;

                _ = self.cancellation_token.cancelled() => break,
                _ = tokio::time::sleep(self.config.polling_interval) => {}
            }
        }
        tracing::info!(cursor = ?self.cursor, "PollLoop has shut down.");
    }
}
