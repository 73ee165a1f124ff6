use std::sync::Arc;

use clap::{Parser, Subcommand};
use deploy_sentinel::{
    cmd::{DryRunArgs, dry_run},
    config::AppConfig,
    persistence::SqliteStateRepository,
    providers::rpc::{EvmRpcSource, create_provider},
    supervisor::Supervisor,
};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directory containing `app.yaml`.
    #[arg(long, global = true)]
    config_dir: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Runs the deployment monitor until SIGINT or SIGTERM.
    Run,
    /// Scans a block range and prints the alerts instead of sending them.
    DryRun(DryRunArgs),
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run => run_supervisor(cli.config_dir.as_deref()).await,
        Commands::DryRun(args) => {
            dry_run::execute(args, cli.config_dir.as_deref()).await.map_err(Into::into)
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Fatal error, exiting.");
    }
    result
}

async fn run_supervisor(config_dir: Option<&str>) -> Result<(), Box<dyn std::error::Error>> {
    tracing::debug!("Loading application configuration...");
    let config = AppConfig::new(config_dir)?;
    tracing::debug!(
        database_url = %config.database_url,
        rpc_url = %config.rpc_url,
        network_id = %config.network_id,
        "Configuration loaded."
    );

    tracing::debug!("Initializing state repository...");
    let repo = Arc::new(SqliteStateRepository::new(&config.database_url, config.db_pool_size).await?);
    repo.run_migrations().await?;
    tracing::info!("Database migrations completed.");

    tracing::debug!(rpc_url = %config.rpc_url, "Initializing EVM data source...");
    let provider =
        create_provider(config.rpc_url.clone(), config.rpc_retry_config.clone(), config.request_timeout)?;
    let evm_data_source = EvmRpcSource::new(provider);
    tracing::info!(retry_policy = ?config.rpc_retry_config, "EVM data source initialized with retry policy.");

    let supervisor = Supervisor::builder()
        .config(config)
        .data_source(Box::new(evm_data_source))
        .state(repo)
        .build()
        .await?;

    tracing::info!("Supervisor initialized, starting monitoring...");

    supervisor.run().await?;

    Ok(())
}
