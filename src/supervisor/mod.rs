//! The Supervisor module manages the lifecycle of the sentinel.
//!
//! The `Supervisor` owns every long-lived component: the seen store, the data
//! source, the block scanner and the notification sender. It runs the poll
//! loop startup (a failure there is fatal), optionally announces itself, then
//! supervises the poll loop and the retention sweep until a shutdown signal
//! arrives. Shutdown lets the in-flight height finish, then checkpoints and
//! closes the database within `shutdown_timeout`.

mod builder;

use std::sync::Arc;

pub use builder::SupervisorBuilder;
use thiserror::Error;
use tokio::signal;
use tokio_util::sync::CancellationToken;

use crate::{
    alert::AlertFormatter,
    config::AppConfig,
    engine::{
        block_scanner::BlockScan,
        poll_loop::{PollLoop, PollLoopError},
    },
    notification::NotificationSender,
    persistence::{SqliteStateRepository, traits::SeenStore},
    providers::traits::DataSource,
};

/// Errors that stop the supervisor.
#[derive(Debug, Error)]
pub enum SupervisorError {
    /// A required configuration was not provided to the `SupervisorBuilder`.
    #[error("Missing configuration for Supervisor")]
    MissingConfig,

    /// A state repository was not provided to the `SupervisorBuilder`.
    #[error("Missing state repository for Supervisor")]
    MissingStateRepository,

    /// A data source was not provided to the `SupervisorBuilder`.
    #[error("Missing data source for Supervisor")]
    MissingDataSource,

    /// The explorer or notification HTTP client could not be built.
    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),

    /// The poll loop could not start (unreachable chain or unusable store).
    #[error("Fatal startup failure: {0}")]
    Startup(#[from] PollLoopError),
}

/// The primary runtime manager for the application.
pub struct Supervisor {
    config: Arc<AppConfig>,
    state: Arc<SqliteStateRepository>,
    data_source: Arc<dyn DataSource>,
    scanner: Arc<dyn BlockScan>,
    sender: Arc<NotificationSender>,
    formatter: AlertFormatter,
    cancellation_token: CancellationToken,
    join_set: tokio::task::JoinSet<()>,
}

impl Supervisor {
    /// Creates a new Supervisor instance with all its required components.
    ///
    /// This is typically called by the `SupervisorBuilder`.
    pub fn new(
        config: Arc<AppConfig>,
        state: Arc<SqliteStateRepository>,
        data_source: Arc<dyn DataSource>,
        scanner: Arc<dyn BlockScan>,
        sender: Arc<NotificationSender>,
        formatter: AlertFormatter,
    ) -> Self {
        Self {
            config,
            state,
            data_source,
            scanner,
            sender,
            formatter,
            cancellation_token: CancellationToken::new(),
            join_set: tokio::task::JoinSet::new(),
        }
    }

    /// Returns a new `SupervisorBuilder` instance.
    pub fn builder() -> SupervisorBuilder {
        SupervisorBuilder::new()
    }

    /// The token cancelled on shutdown. Cancelling it stops the supervisor.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancellation_token.clone()
    }

    /// Starts the poll loop and supervises it until shutdown.
    ///
    /// Returns an error only for fatal startup failures.
    pub async fn run(mut self) -> Result<(), SupervisorError> {
        self.spawn_signal_handler();

        let mut poll_loop = PollLoop::new(
            Arc::clone(&self.config),
            Arc::clone(&self.data_source),
            Arc::clone(&self.scanner),
            Arc::clone(&self.state),
            self.cancellation_token.clone(),
        );
        if let Err(e) = poll_loop.start().await {
            self.cancellation_token.cancel();
            self.join_set.shutdown().await;
            self.state.close().await;
            return Err(e.into());
        }

        if self.config.announce_startup {
            match self.sender.send(&self.formatter.startup_message()).await {
                Ok(()) => tracing::info!("Startup message sent."),
                Err(e) => tracing::warn!(error = %e, "Failed to send startup message, continuing."),
            }
        }

        self.join_set.spawn(poll_loop.run());
        self.spawn_retention_sweep();

        loop {
            tokio::select! {
                maybe_result = self.join_set.join_next() => {
                    match maybe_result {
                        Some(Ok(())) => {}
                        Some(Err(e)) => {
                            tracing::error!("A critical task failed: {:?}. Initiating shutdown.", e);
                            self.cancellation_token.cancel();
                        }
                        None => break,
                    }
                }
                _ = self.cancellation_token.cancelled() => break,
            }
        }

        // Tasks observe the token; an in-flight height is allowed to finish.
        while let Some(result) = self.join_set.join_next().await {
            if let Err(e) = result {
                tracing::error!("Task failed during shutdown: {:?}", e);
            }
        }
        tracing::info!("All supervised tasks have completed.");

        self.cleanup().await;
        tracing::info!("Supervisor shutdown complete.");
        Ok(())
    }

    fn spawn_signal_handler(&mut self) {
        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            let ctrl_c = signal::ctrl_c();
            #[cfg(unix)]
            let terminate = async {
                match signal::unix::signal(signal::unix::SignalKind::terminate()) {
                    Ok(mut sigterm) => {
                        sigterm.recv().await;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to register SIGTERM handler.");
                        std::future::pending::<()>().await;
                    }
                }
            };
            #[cfg(not(unix))]
            let terminate = std::future::pending::<()>();

            tokio::select! {
                _ = ctrl_c => tracing::info!("SIGINT (Ctrl+C) received, initiating graceful shutdown."),
                _ = terminate => tracing::info!("SIGTERM received, initiating graceful shutdown."),
                _ = cancellation_token.cancelled() => return,
            }

            cancellation_token.cancel();
        });
    }

    fn spawn_retention_sweep(&mut self) {
        let state = Arc::clone(&self.state);
        let retention = self.config.retention;
        let interval = self.config.sweep_interval;
        let cancellation_token = self.cancellation_token.clone();
        self.join_set.spawn(async move {
            loop {
                tokio::select! {
                    biased;

                    _ = cancellation_token.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        match state.sweep(retention).await {
                            Ok(removed) => tracing::info!(removed, "Retention sweep completed."),
                            Err(e) => tracing::error!(error = %e, "Retention sweep failed."),
                        }
                    }
                }
            }
        });
    }

    async fn cleanup(&self) {
        tracing::info!("Starting graceful resource cleanup...");
        let shutdown_timeout = self.config.shutdown_timeout;

        let cleanup_logic = async {
            if let Err(e) = self.state.flush().await {
                tracing::error!(error = %e, "Failed to flush pending writes, but continuing cleanup.");
            }
            self.state.close().await;
        };

        if tokio::time::timeout(shutdown_timeout, cleanup_logic).await.is_err() {
            tracing::warn!(
                "Cleanup did not complete within the timeout of {:?}. Continuing shutdown.",
                shutdown_timeout
            );
        } else {
            tracing::info!("Cleanup completed successfully.");
        }
    }
}
