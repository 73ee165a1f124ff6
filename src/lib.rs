#![warn(missing_docs)]
//! Deploy Sentinel watches an EVM chain for new contract deployments and
//! announces the ones with verified source code to a Telegram chat.

pub mod alert;
pub mod cmd;
pub mod config;
pub mod engine;
pub mod explorer;
pub mod http_client;
pub mod models;
pub mod notification;
pub mod persistence;
pub mod providers;
pub mod supervisor;
pub mod test_helpers;
