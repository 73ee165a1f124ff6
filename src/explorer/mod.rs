//! Source verification and metadata lookups against a block explorer.
//!
//! Two endpoints are used: the Etherscan-compatible
//! `?module=contract&action=getsourcecode` API and the Blockscout
//! `/api/v2/smart-contracts/{address}` API. Lookups never fail from the
//! caller's point of view. Errors degrade to "not verified" or "no metadata"
//! and transport-level retries happen inside the HTTP client.

use std::{sync::Arc, time::Duration};

use alloy::primitives::Address;
use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use reqwest_middleware::ClientWithMiddleware;
use serde_json::Value;
use thiserror::Error;

use crate::{
    config::{ExplorerConfig, HttpRetryConfig},
    http_client::create_retryable_http_client,
    models::{MetadataRecord, VerificationRecord},
    notification::rate_limiter::RateLimiter,
};

/// Decides whether a contract is verified and gathers its metadata.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait VerificationGate: Send + Sync {
    /// Looks up the source verification record of `address`.
    async fn check(&self, address: &Address) -> VerificationRecord;

    /// Fetches off-chain metadata of `address`; empty on any failure.
    async fn fetch_metadata(&self, address: &Address) -> MetadataRecord;
}

/// Failures of a single explorer call. Never leaves this module.
#[derive(Debug, Error)]
pub enum ExplorerError {
    /// The request could not be completed, retries included.
    #[error("Explorer request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),

    /// The response body could not be read as JSON.
    #[error("Failed to decode explorer response: {0}")]
    Decode(#[from] reqwest::Error),

    /// The explorer answered with a non-success status.
    #[error("Explorer returned HTTP {0}")]
    Status(reqwest::StatusCode),
}

/// HTTP client for the explorer APIs.
pub struct ExplorerClient {
    http: ClientWithMiddleware,
    config: ExplorerConfig,
    request_timeout: Duration,
}

impl ExplorerClient {
    /// Creates a new client on top of `base_client`.
    ///
    /// Transient failures are retried per `retry`, and every request attempt
    /// takes one slot from `limiter`.
    pub fn new(
        base_client: reqwest::Client,
        retry: &HttpRetryConfig,
        limiter: Arc<RateLimiter>,
        config: ExplorerConfig,
        request_timeout: Duration,
    ) -> Self {
        let http = create_retryable_http_client(retry, base_client, limiter);
        Self { http, config, request_timeout }
    }

    /// Returns the first entry of the `getsourcecode` result, if any.
    async fn fetch_source_entry(&self, address: &Address) -> Result<Option<Value>, ExplorerError> {
        let address = address.to_string();
        let mut request = self
            .http
            .get(self.config.api_url.clone())
            .query(&[
                ("module", "contract"),
                ("action", "getsourcecode"),
                ("address", address.as_str()),
            ])
            .timeout(self.request_timeout);
        if let Some(api_key) = &self.config.api_key {
            request = request.query(&[("apikey", api_key)]);
        }

        let response = request.send().await?;
        if !response.status().is_success() {
            return Err(ExplorerError::Status(response.status()));
        }

        let body: Value = response.json().await?;
        // `result` is a string such as "Invalid Address format" on errors.
        Ok(body
            .get("result")
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .cloned())
    }

    async fn fetch_links(&self, address: &Address) -> Result<Option<Value>, ExplorerError> {
        let url = format!(
            "{}/api/v2/smart-contracts/{address}",
            self.config.ui_url.as_str().trim_end_matches('/')
        );
        let response = self.http.get(url).timeout(self.request_timeout).send().await?;
        if response.status() != reqwest::StatusCode::OK {
            return Err(ExplorerError::Status(response.status()));
        }

        let mut body: Value = response.json().await?;
        Ok(body.get_mut("links").map(Value::take))
    }
}

#[async_trait]
impl VerificationGate for ExplorerClient {
    #[tracing::instrument(skip(self), level = "debug")]
    async fn check(&self, address: &Address) -> VerificationRecord {
        match self.fetch_source_entry(address).await {
            Ok(entry) => {
                let record = VerificationRecord::from_entry(entry.as_ref());
                tracing::debug!(
                    %address,
                    verified = record.verified,
                    contract_name = ?record.contract_name,
                    "Verification lookup completed."
                );
                record
            }
            Err(e) => {
                tracing::warn!(%address, error = %e, "Verification lookup failed, treating as unverified.");
                VerificationRecord::unverified()
            }
        }
    }

    #[tracing::instrument(skip(self), level = "debug")]
    async fn fetch_metadata(&self, address: &Address) -> MetadataRecord {
        match self.fetch_links(address).await {
            Ok(links) => MetadataRecord::from_links(links.as_ref()),
            Err(e) => {
                tracing::debug!(%address, error = %e, "Metadata lookup failed, continuing without it.");
                MetadataRecord::default()
            }
        }
    }
}
