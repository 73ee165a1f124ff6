//! This module provides the `SupervisorBuilder` for constructing a `Supervisor`.

use std::sync::Arc;

use super::{Supervisor, SupervisorError};
use crate::{
    alert::AlertFormatter,
    config::AppConfig,
    engine::block_scanner::BlockScanner,
    explorer::{ExplorerClient, VerificationGate},
    notification::{
        NotificationChannel, NotificationSender, rate_limiter::RateLimiter, retry::RetryPolicy,
        telegram::TelegramChannel,
    },
    persistence::SqliteStateRepository,
    providers::traits::DataSource,
};

/// A builder for creating a `Supervisor` instance.
///
/// The verification gate and the notification channel default to the
/// explorer client and the Telegram channel described by the configuration.
#[derive(Default)]
pub struct SupervisorBuilder {
    config: Option<AppConfig>,
    state: Option<Arc<SqliteStateRepository>>,
    data_source: Option<Box<dyn DataSource>>,
    gate: Option<Arc<dyn VerificationGate>>,
    channel: Option<Arc<dyn NotificationChannel>>,
}

impl SupervisorBuilder {
    /// Creates a new, empty `SupervisorBuilder`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the application configuration for the `Supervisor`.
    pub fn config(mut self, config: AppConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the state repository (database connection) for the `Supervisor`.
    pub fn state(mut self, state: Arc<SqliteStateRepository>) -> Self {
        self.state = Some(state);
        self
    }

    /// Sets the data source (e.g., RPC client) for the `Supervisor`.
    pub fn data_source(mut self, data_source: Box<dyn DataSource>) -> Self {
        self.data_source = Some(data_source);
        self
    }

    /// Overrides the verification gate.
    pub fn verification_gate(mut self, gate: Arc<dyn VerificationGate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Overrides the notification channel.
    pub fn notification_channel(mut self, channel: Arc<dyn NotificationChannel>) -> Self {
        self.channel = Some(channel);
        self
    }

    /// Assembles and validates the components to build a `Supervisor`.
    pub async fn build(self) -> Result<Supervisor, SupervisorError> {
        let config = Arc::new(self.config.ok_or(SupervisorError::MissingConfig)?);
        let state = self.state.ok_or(SupervisorError::MissingStateRepository)?;
        let data_source: Arc<dyn DataSource> =
            Arc::from(self.data_source.ok_or(SupervisorError::MissingDataSource)?);

        let gate: Arc<dyn VerificationGate> = match self.gate {
            Some(gate) => gate,
            None => {
                tracing::debug!(api_url = %config.explorer.api_url, "Explorer client initialized.");
                Arc::new(ExplorerClient::new(
                    config.http_base_config.build_client()?,
                    &config.http_retry_config,
                    Arc::new(RateLimiter::per_minute(config.explorer_rate_limit)),
                    config.explorer.clone(),
                    config.request_timeout,
                ))
            }
        };

        let channel: Arc<dyn NotificationChannel> = match self.channel {
            Some(channel) => channel,
            None => Arc::new(TelegramChannel::new(
                config.http_base_config.build_client()?,
                &config.telegram_api_url,
                &config.telegram_bot_token,
                config.chat_id.clone(),
                config.request_timeout,
            )),
        };

        let sender = Arc::new(NotificationSender::new(
            channel,
            Arc::new(RateLimiter::per_minute(config.notification_rate_limit)),
            RetryPolicy::from_config(&config.http_retry_config),
        ));
        let formatter = AlertFormatter::new(&config.network_name, &config.explorer, &config.links);

        let scanner = BlockScanner::new(
            Arc::clone(&data_source),
            gate,
            Arc::clone(&state),
            formatter.clone(),
            Arc::clone(&sender),
            config.verification_concurrency,
        );
        tracing::info!(
            network = %config.network_name,
            verification_concurrency = config.verification_concurrency,
            "Block scanner initialized."
        );

        Ok(Supervisor::new(config, state, data_source, Arc::new(scanner), sender, formatter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        explorer::MockVerificationGate, notification::MockNotificationChannel,
        providers::traits::MockDataSource,
    };

    async fn state() -> Arc<SqliteStateRepository> {
        Arc::new(SqliteStateRepository::new("sqlite::memory:", 1).await.unwrap())
    }

    #[tokio::test]
    async fn build_succeeds_with_default_gate_and_channel() {
        let builder = SupervisorBuilder::new()
            .config(AppConfig::builder().build())
            .state(state().await)
            .data_source(Box::new(MockDataSource::new()));

        assert!(builder.build().await.is_ok());
    }

    #[tokio::test]
    async fn build_succeeds_with_overrides() {
        let builder = SupervisorBuilder::new()
            .config(AppConfig::builder().build())
            .state(state().await)
            .data_source(Box::new(MockDataSource::new()))
            .verification_gate(Arc::new(MockVerificationGate::new()))
            .notification_channel(Arc::new(MockNotificationChannel::new()));

        assert!(builder.build().await.is_ok());
    }

    #[tokio::test]
    async fn build_fails_if_config_is_missing() {
        let builder = SupervisorBuilder::new()
            .state(state().await)
            .data_source(Box::new(MockDataSource::new()));

        let result = builder.build().await;
        assert!(matches!(result, Err(SupervisorError::MissingConfig)));
    }

    #[tokio::test]
    async fn build_fails_if_state_repository_is_missing() {
        let builder = SupervisorBuilder::new()
            .config(AppConfig::builder().build())
            .data_source(Box::new(MockDataSource::new()));

        let result = builder.build().await;
        assert!(matches!(result, Err(SupervisorError::MissingStateRepository)));
    }

    #[tokio::test]
    async fn build_fails_if_data_source_is_missing() {
        let builder = SupervisorBuilder::new()
            .config(AppConfig::builder().build())
            .state(state().await);

        let result = builder.build().await;
        assert!(matches!(result, Err(SupervisorError::MissingDataSource)));
    }
}
