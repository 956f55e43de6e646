use anyhow::{Context, Result};
use cache::TtlCache;
use clap::{Parser, Subcommand};
use common::Payload;
use config::{generate_default_config, load_config, save_config, validate_config, AppConfig};
use feeds::{
    build_jobs, FmpClient, MarketFeed, PolymarketClient, PredictionFeed, RefreshScheduler,
    ShutdownController, SocialDataClient, SocialFeed,
};
use observability::LogFormat;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};

mod snapshot;

const SNAPSHOT_INTERVAL: Duration = Duration::from_secs(60);

#[derive(Parser, Debug)]
#[command(name = "pulse")]
#[command(about = "MarketPulse - cached market analytics daemon")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the refresh scheduler until Ctrl+C
    Start {
        /// Path to the configuration file
        #[arg(short, long, default_value = "pulse.yaml")]
        config: PathBuf,
    },

    /// Validate a configuration file without starting
    Validate {
        /// Path to the configuration file
        #[arg(short, long, default_value = "pulse.yaml")]
        config: PathBuf,
    },

    /// Write a default configuration file
    Init {
        /// Output path for the new configuration file
        #[arg(short, long, default_value = "pulse.yaml")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { config } => start(config).await,
        Commands::Validate { config } => validate(config),
        Commands::Init { output } => init(output),
    }
}

fn init_logging_from(config: &AppConfig) -> Result<()> {
    let format = LogFormat::parse(&config.log.format).unwrap_or_default();
    observability::init_logging_with_level("pulse", format, &config.log.level)
}

async fn start(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;
    init_logging_from(&config)?;

    if let Err(errors) = validate_config(&config) {
        for e in &errors {
            error!("config error: {e}");
        }
        anyhow::bail!("cannot start with {} configuration errors", errors.len());
    }
    info!(config = %config_path.display(), "configuration loaded and validated");

    let timeout = Duration::from_secs(config.providers.request_timeout_secs);
    let market: Arc<dyn MarketFeed> = Arc::new(FmpClient::new(
        &config.providers.fmp_base_url,
        &config.providers.fmp_api_key,
        timeout,
    )?);
    let prediction: Arc<dyn PredictionFeed> = Arc::new(PolymarketClient::new(
        &config.providers.polymarket_base_url,
        timeout,
    )?);
    let social: Option<Arc<dyn SocialFeed>> = if config.providers.socialdata_api_key.is_empty() {
        warn!("no SocialData API key configured, social sentiment job disabled");
        None
    } else {
        Some(Arc::new(SocialDataClient::new(
            &config.providers.socialdata_base_url,
            &config.providers.socialdata_api_key,
            timeout,
        )?))
    };

    let cache = Arc::new(TtlCache::<Payload>::new());
    let mut scheduler = RefreshScheduler::new(Arc::clone(&cache), config.refresh.clone());
    scheduler.start(build_jobs(&config, market, prediction, social));

    let shutdown = ShutdownController::with_ctrl_c();
    info!("MarketPulse running, press Ctrl+C to stop");

    let mut ticker = tokio::time::interval(SNAPSHOT_INTERVAL);
    loop {
        tokio::select! {
            _ = shutdown.wait_for_shutdown() => break,
            _ = ticker.tick() => {
                let snap = snapshot::assemble(&cache, &config);
                info!(cache_entries = cache.len(), "analytics snapshot: {}", snap.summary());
            }
        }
    }

    info!("shutting down");
    scheduler.shutdown().await;
    info!("goodbye");
    Ok(())
}

fn validate(config_path: PathBuf) -> Result<()> {
    let config = load_config(&config_path)
        .with_context(|| format!("failed to load config from {}", config_path.display()))?;

    match validate_config(&config) {
        Ok(()) => {
            println!("Configuration valid: {}", config_path.display());
            Ok(())
        }
        Err(errors) => {
            println!("Configuration invalid ({} errors):", errors.len());
            for e in &errors {
                println!("  - {e}");
            }
            anyhow::bail!("validation failed");
        }
    }
}

fn init(output: PathBuf) -> Result<()> {
    if output.exists() {
        anyhow::bail!("refusing to overwrite existing file {}", output.display());
    }
    let config = generate_default_config();
    save_config(&config, &output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Wrote default configuration to {}", output.display());
    println!("Set FMP_API_KEY in the environment before starting.");
    Ok(())
}
