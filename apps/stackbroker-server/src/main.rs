use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use broker::{Broker, BrokerOptions};
use broker_aws::{resolve_session, AwsClientFactory, SessionSettings};
use broker_bootstrap::{AppConfig, CliArgs};
use catalog::{CatalogSynchronizer, IntervalPoller};
use clap::{Parser, Subcommand};

/// stackbroker - open service broker for CloudFormation stacks
#[derive(Parser)]
#[command(name = "stackbroker-server")]
#[command(about = "Open service broker that provisions CloudFormation stacks")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Print effective configuration (YAML) and exit
    #[arg(long)]
    print_config: bool,

    /// Log verbosity level (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the broker
    Run,
    /// Validate configuration and exit
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let args = CliArgs {
        config: cli.config.as_ref().map(|p| p.to_string_lossy().to_string()),
        print_config: cli.print_config,
        verbose: cli.verbose,
    };

    // Layered config: defaults -> YAML (if provided) -> env (BROKER__*)
    // -> CLI overrides.
    let mut config = AppConfig::load_or_default(cli.config.as_deref())?;
    config.apply_cli_overrides(&args);

    let logging_config = config.logging.clone().unwrap_or_default();
    broker_bootstrap::init_logging(&logging_config, Path::new("."), cli.verbose);

    if cli.print_config {
        println!("{}", config.to_yaml()?);
        return Ok(());
    }

    match cli.command.unwrap_or(Commands::Run) {
        Commands::Run => run_broker(config).await,
        Commands::Check => check_config(config),
    }
}

async fn run_broker(config: AppConfig) -> Result<()> {
    config.validate()?;
    tracing::info!("stackbroker starting");

    let session = resolve_session(&SessionSettings {
        region: config.broker.region.clone(),
        profile: config.broker.profile.clone(),
        key_id: config.broker.key_id.clone(),
        secret_key: config.broker.secret_key.clone(),
    })
    .await;

    let factory = Arc::new(
        AwsClientFactory::new(session, &config.broker.table_name)
            .with_storage_region(&config.storage.region),
    );
    let synchronizer = Arc::new(CatalogSynchronizer::production());
    let poller = Arc::new(IntervalPoller::new(config.catalog.poll_interval));

    let options = BrokerOptions {
        key_id: config.broker.key_id.clone(),
        secret_key: config.broker.secret_key.clone(),
        profile: config.broker.profile.clone(),
        region: config.broker.region.clone(),
        broker_id: config.broker.broker_id.clone(),
        s3_bucket: config.storage.bucket.clone(),
        s3_region: config.storage.region.clone(),
        s3_key: config.storage.key_prefix.clone(),
        table_name: config.broker.table_name.clone(),
        template_filter: config.storage.template_filter.clone(),
        poll_interval: config.catalog.poll_interval,
    };

    let broker = Broker::new(options, factory, synchronizer, poller)
        .await
        .context("broker bootstrap failed")?;
    tracing::info!(
        account_id = broker.account_id(),
        services = broker.catalog().len(),
        "stackbroker ready"
    );

    broker_bootstrap::wait_for_shutdown().await?;
    broker.shutdown();
    Ok(())
}

fn check_config(config: AppConfig) -> Result<()> {
    config.validate()?;
    println!("Configuration is valid");
    println!("{}", config.to_yaml()?);
    Ok(())
}
