//! `dry-run`: scans a closed block range against the real chain and explorer
//! without sending or persisting anything.

use std::sync::Arc;

use clap::Parser;
use serde::Serialize;
use thiserror::Error;

use crate::{
    alert::AlertFormatter,
    config::AppConfig,
    engine::block_scanner::{BlockScan, BlockScanner, ScanSummary},
    explorer::ExplorerClient,
    notification::{
        NotificationSender, rate_limiter::RateLimiter, retry::RetryPolicy, stdout::StdoutChannel,
    },
    persistence::{SqliteStateRepository, error::PersistenceError},
    providers::rpc::{EvmRpcSource, ProviderError, create_provider},
};

/// Errors of the dry-run command.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration could not be loaded.
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    /// The RPC provider could not be created.
    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),
    /// The in-memory seen store could not be set up.
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    /// The explorer HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),
    /// The report could not be serialized.
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
    /// `from_block` is above `to_block`.
    #[error("Invalid block range: {from}..={to}")]
    InvalidRange {
        /// First block of the range.
        from: u64,
        /// Last block of the range.
        to: u64,
    },
}

/// Arguments of the dry-run command.
#[derive(Parser, Debug)]
pub struct DryRunArgs {
    /// The starting block number.
    #[arg(short, long)]
    pub from_block: u64,
    /// The ending block number, inclusive.
    #[arg(short, long)]
    pub to_block: u64,
}

/// Totals printed at the end of a dry run.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct DryRunReport {
    /// First scanned height.
    pub from_block: u64,
    /// Last scanned height.
    pub to_block: u64,
    /// Heights scanned successfully.
    pub blocks_scanned: u64,
    /// Heights whose scan failed.
    pub failed_blocks: Vec<u64>,
    /// Contract creation transactions seen.
    pub creations: usize,
    /// Addresses already handled earlier in the run.
    pub already_seen: usize,
    /// New contracts without verified source.
    pub unverified: usize,
    /// Alerts printed.
    pub alerted: usize,
    /// Alerts that could not be printed.
    pub delivery_failures: usize,
}

impl DryRunReport {
    fn record(&mut self, summary: &ScanSummary) {
        self.blocks_scanned += 1;
        self.creations += summary.creations;
        self.already_seen += summary.already_seen;
        self.unverified += summary.unverified;
        self.alerted += summary.alerted;
        self.delivery_failures += summary.delivery_failures;
    }
}

/// Scans `from..=to` in order. A failing height is recorded and skipped.
pub async fn scan_range<B: BlockScan + ?Sized>(scanner: &B, from: u64, to: u64) -> DryRunReport {
    let mut report = DryRunReport { from_block: from, to_block: to, ..Default::default() };
    for height in from..=to {
        match scanner.scan(height).await {
            Ok(summary) => report.record(&summary),
            Err(e) => {
                tracing::error!(height, error = %e, "Failed to scan block.");
                report.failed_blocks.push(height);
            }
        }
    }
    report
}

/// Runs the dry-run command.
pub async fn execute(args: DryRunArgs, config_dir: Option<&str>) -> Result<(), Error> {
    if args.from_block > args.to_block {
        return Err(Error::InvalidRange { from: args.from_block, to: args.to_block });
    }

    let config = AppConfig::new(config_dir)?;

    let provider =
        create_provider(config.rpc_url.clone(), config.rpc_retry_config.clone(), config.request_timeout)?;
    let data_source = Arc::new(EvmRpcSource::new(provider));

    // Seen records only need to live for the duration of the run.
    let store = SqliteStateRepository::new("sqlite::memory:", 1).await?;
    store.run_migrations().await?;
    let store = Arc::new(store);

    let gate = Arc::new(ExplorerClient::new(
        config.http_base_config.build_client()?,
        &config.http_retry_config,
        Arc::new(RateLimiter::per_minute(config.explorer_rate_limit)),
        config.explorer.clone(),
        config.request_timeout,
    ));

    let sender = Arc::new(NotificationSender::new(
        Arc::new(StdoutChannel::new()),
        Arc::new(RateLimiter::per_minute(u32::MAX)),
        RetryPolicy::from_config(&config.http_retry_config),
    ));
    let formatter = AlertFormatter::new(&config.network_name, &config.explorer, &config.links);
    let scanner = BlockScanner::new(
        data_source,
        gate,
        Arc::clone(&store),
        formatter,
        sender,
        config.verification_concurrency,
    );

    tracing::info!(from = args.from_block, to = args.to_block, "Starting block processing...");
    let report = scan_range(&scanner, args.from_block, args.to_block).await;
    tracing::info!("Block processing finished.");
    store.close().await;

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use mockall::{Sequence, predicate::eq};

    use super::*;
    use crate::{
        engine::block_scanner::{MockBlockScan, ScanError},
        providers::traits::DataSourceError,
    };

    #[tokio::test]
    async fn test_scan_range_aggregates_summaries_in_order() {
        let mut scanner = MockBlockScan::new();
        let mut seq = Sequence::new();
        for height in 10..=12 {
            scanner.expect_scan().with(eq(height)).times(1).in_sequence(&mut seq).returning(
                move |n| {
                    Ok(ScanSummary {
                        block_number: n,
                        creations: 2,
                        unverified: 1,
                        alerted: 1,
                        ..Default::default()
                    })
                },
            );
        }

        let report = scan_range(&scanner, 10, 12).await;

        assert_eq!(report.blocks_scanned, 3);
        assert_eq!(report.creations, 6);
        assert_eq!(report.alerted, 3);
        assert!(report.failed_blocks.is_empty());
    }

    #[tokio::test]
    async fn test_scan_range_records_failed_heights() {
        let mut scanner = MockBlockScan::new();
        scanner
            .expect_scan()
            .with(eq(5))
            .returning(|n| Err(ScanError::DataSource(DataSourceError::BlockNotFound(n))));
        scanner.expect_scan().returning(|n| Ok(ScanSummary { block_number: n, ..Default::default() }));

        let report = scan_range(&scanner, 4, 6).await;

        assert_eq!(report.blocks_scanned, 2);
        assert_eq!(report.failed_blocks, vec![5]);
    }

    #[tokio::test]
    async fn test_execute_rejects_inverted_range() {
        let result = execute(DryRunArgs { from_block: 10, to_block: 9 }, None).await;
        assert!(matches!(result, Err(Error::InvalidRange { from: 10, to: 9 })));
    }
}
