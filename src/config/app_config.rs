use std::{path::Path, time::Duration};

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;
use url::Url;

use super::{
    AlertLinksConfig, BaseHttpClientConfig, CursorMode, ExplorerConfig, HttpRetryConfig,
    RpcRetryConfig, deserialize_duration_from_days, deserialize_duration_from_seconds,
};

/// Prefix of the environment variables read by [`AppConfig::new`].
pub const ENV_PREFIX: &str = "SENTINEL";

fn default_chat_id() -> String {
    "-1002714144239".to_string()
}

fn default_telegram_api_url() -> Url {
    Url::parse("https://api.telegram.org").expect("static telegram api url")
}

fn default_network_id() -> String {
    "story".to_string()
}

fn default_network_name() -> String {
    "Story".to_string()
}

fn default_polling_interval() -> Duration {
    Duration::from_secs(6)
}

fn default_database_url() -> String {
    "sqlite://seen_contracts.db".to_string()
}

fn default_db_pool_size() -> u32 {
    5
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_retention() -> Duration {
    Duration::from_secs(30 * 24 * 60 * 60)
}

fn default_sweep_interval() -> Duration {
    Duration::from_secs(60 * 60)
}

fn default_rate_limit() -> u32 {
    20
}

fn default_verification_concurrency() -> usize {
    1
}

fn default_announce_startup() -> bool {
    true
}

fn default_shutdown_timeout() -> Duration {
    Duration::from_secs(30)
}

/// Application configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    /// Telegram bot token used to deliver alerts.
    pub telegram_bot_token: String,

    /// RPC URL of the watched chain.
    pub rpc_url: Url,

    /// Destination chat of the alerts.
    #[serde(default = "default_chat_id")]
    pub chat_id: String,

    /// Telegram Bot API base URL.
    #[serde(default = "default_telegram_api_url")]
    pub telegram_api_url: Url,

    /// Identifier under which the cursor is persisted.
    #[serde(default = "default_network_id")]
    pub network_id: String,

    /// Human readable chain name used in alert headlines.
    #[serde(default = "default_network_name")]
    pub network_name: String,

    /// Pause between two polls of the chain head.
    #[serde(
        rename = "polling_interval_secs",
        default = "default_polling_interval",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub polling_interval: Duration,

    /// SQLite database URL of the seen-contract store.
    #[serde(default = "default_database_url")]
    pub database_url: String,

    /// Maximum number of pooled database connections.
    #[serde(default = "default_db_pool_size")]
    pub db_pool_size: u32,

    /// Timeout applied to every outbound call.
    #[serde(
        rename = "request_timeout_secs",
        default = "default_request_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub request_timeout: Duration,

    /// Age after which seen records are swept.
    #[serde(
        rename = "retention_days",
        default = "default_retention",
        deserialize_with = "deserialize_duration_from_days"
    )]
    pub retention: Duration,

    /// Period of the background retention sweep.
    #[serde(
        rename = "sweep_interval_secs",
        default = "default_sweep_interval",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub sweep_interval: Duration,

    /// Notifications allowed per minute.
    #[serde(default = "default_rate_limit")]
    pub notification_rate_limit: u32,

    /// Explorer lookups allowed per minute.
    #[serde(default = "default_rate_limit")]
    pub explorer_rate_limit: u32,

    /// Verification lookups running in parallel inside one block.
    #[serde(default = "default_verification_concurrency")]
    pub verification_concurrency: usize,

    /// Source of the initial cursor.
    #[serde(default)]
    pub cursor_mode: CursorMode,

    /// Whether a message is sent once the monitor is up.
    #[serde(default = "default_announce_startup")]
    pub announce_startup: bool,

    /// The maximum time to wait for graceful shutdown.
    #[serde(
        rename = "shutdown_timeout_secs",
        default = "default_shutdown_timeout",
        deserialize_with = "deserialize_duration_from_seconds"
    )]
    pub shutdown_timeout: Duration,

    /// Retry policy for explorer calls and notification sends.
    #[serde(default)]
    pub http_retry_config: HttpRetryConfig,

    /// Retry policy of the RPC transport.
    #[serde(default)]
    pub rpc_retry_config: RpcRetryConfig,

    /// Connection settings of the shared HTTP clients.
    #[serde(default)]
    pub http_base_config: BaseHttpClientConfig,

    /// Block explorer endpoints.
    #[serde(default)]
    pub explorer: ExplorerConfig,

    /// Extra alert buttons.
    #[serde(default)]
    pub links: AlertLinksConfig,
}

impl AppConfig {
    /// Loads the configuration from `<config_dir>/app.yaml` (optional) and
    /// `SENTINEL__*` environment variables, the latter taking precedence.
    pub fn new(config_dir: Option<&str>) -> Result<Self, ConfigError> {
        let config_dir = Path::new(config_dir.unwrap_or("configs"));
        let s = Config::builder()
            .add_source(File::from(config_dir.join("app.yaml")).required(false))
            .add_source(Environment::with_prefix(ENV_PREFIX).separator("__").try_parsing(true))
            .build()?;
        let config: Self = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values that would stall or break the pipeline.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.telegram_bot_token.trim().is_empty() {
            return Err(ConfigError::Message("telegram_bot_token must not be empty".into()));
        }
        if self.notification_rate_limit == 0 || self.explorer_rate_limit == 0 {
            return Err(ConfigError::Message("rate limits must be greater than zero".into()));
        }
        if self.db_pool_size == 0 {
            return Err(ConfigError::Message("db_pool_size must be greater than zero".into()));
        }
        if self.http_retry_config.max_retries == 0 {
            return Err(ConfigError::Message(
                "http_retry_config.max_retries must allow at least one attempt".into(),
            ));
        }
        if self.verification_concurrency == 0 {
            return Err(ConfigError::Message(
                "verification_concurrency must be greater than zero".into(),
            ));
        }
        Ok(())
    }

    /// Creates a new `AppConfigBuilder` for testing purposes.
    #[cfg(test)]
    pub fn builder() -> AppConfigBuilder {
        AppConfigBuilder::default()
    }
}

/// A builder for creating `AppConfig` instances for testing.
#[cfg(test)]
pub struct AppConfigBuilder {
    config: AppConfig,
}

#[cfg(test)]
impl Default for AppConfigBuilder {
    fn default() -> Self {
        Self {
            config: AppConfig {
                telegram_bot_token: "test-token".to_string(),
                rpc_url: Url::parse("http://localhost:8545").unwrap(),
                chat_id: default_chat_id(),
                telegram_api_url: default_telegram_api_url(),
                network_id: "testnet".to_string(),
                network_name: default_network_name(),
                polling_interval: Duration::from_millis(10),
                database_url: "sqlite::memory:".to_string(),
                db_pool_size: default_db_pool_size(),
                request_timeout: Duration::from_secs(5),
                retention: default_retention(),
                sweep_interval: default_sweep_interval(),
                notification_rate_limit: default_rate_limit(),
                explorer_rate_limit: default_rate_limit(),
                verification_concurrency: default_verification_concurrency(),
                cursor_mode: CursorMode::default(),
                announce_startup: false,
                shutdown_timeout: default_shutdown_timeout(),
                http_retry_config: HttpRetryConfig::default(),
                rpc_retry_config: RpcRetryConfig::default(),
                http_base_config: BaseHttpClientConfig::default(),
                explorer: ExplorerConfig::default(),
                links: AlertLinksConfig::default(),
            },
        }
    }
}

#[cfg(test)]
impl AppConfigBuilder {
    pub fn network_id(mut self, network_id: &str) -> Self {
        self.config.network_id = network_id.to_string();
        self
    }

    pub fn cursor_mode(mut self, mode: CursorMode) -> Self {
        self.config.cursor_mode = mode;
        self
    }

    pub fn polling_interval(mut self, interval_ms: u64) -> Self {
        self.config.polling_interval = Duration::from_millis(interval_ms);
        self
    }

    pub fn verification_concurrency(mut self, concurrency: usize) -> Self {
        self.config.verification_concurrency = concurrency;
        self
    }

    pub fn http_retry_config(mut self, retry: HttpRetryConfig) -> Self {
        self.config.http_retry_config = retry;
        self
    }

    pub fn announce_startup(mut self, announce: bool) -> Self {
        self.config.announce_startup = announce;
        self
    }

    pub fn sweep_interval(mut self, interval_ms: u64) -> Self {
        self.config.sweep_interval = Duration::from_millis(interval_ms);
        self
    }

    pub fn build(self) -> AppConfig {
        self.config
    }
}
