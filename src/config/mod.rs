//! Configuration module for the deployment sentinel.

mod app_config;
mod cursor_mode;
mod helpers;
mod http_base;
mod http_retry;
mod links;
mod rpc_retry;

pub use app_config::{AppConfig, ENV_PREFIX};
pub use cursor_mode::CursorMode;
pub use helpers::{
    deserialize_duration_from_days, deserialize_duration_from_ms,
    deserialize_duration_from_seconds, serialize_duration_to_ms, serialize_duration_to_seconds,
};
pub use http_base::BaseHttpClientConfig;
pub use http_retry::{HttpRetryConfig, JitterSetting};
pub use links::{AlertLinksConfig, ExplorerConfig};
pub use rpc_retry::RpcRetryConfig;
