//! calorie-scale CLI
//!
//! Streams keyword activity as an OSC intensity signal.

use anyhow::Context;
use calorie_scale::{
    config::Config, logging::init_logging, Engine, IntensityEstimator, OscTransport,
    ShutdownController, TwitterClient, TwitterConfig, VERSION,
};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "calorie-scale")]
#[command(version = VERSION)]
#[command(about = "Streams keyword activity as an OSC intensity signal", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start sampling and publishing until Ctrl+C
    Start {
        #[command(flatten)]
        overrides: Overrides,

        /// Log level (overridden by RUST_LOG)
        #[arg(long, default_value = "info")]
        log_level: String,

        /// Emit logs as JSON
        #[arg(long)]
        log_json: bool,
    },

    /// Show the effective configuration
    Config {
        #[command(flatten)]
        overrides: Overrides,
    },

    /// Estimate intensity for a list of RFC 3339 timestamps, newest first
    Estimate {
        /// Mean gap in seconds treated as zero intensity
        #[arg(long, default_value_t = calorie_scale::config::DEFAULT_THRESHOLD_SECS)]
        threshold: u32,

        /// Timestamps, e.g. 2024-01-22T10:00:06Z
        #[arg(required = true)]
        timestamps: Vec<String>,
    },
}

/// Flags layered over the config file.
#[derive(Args)]
struct Overrides {
    /// Path to a JSON config file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Mean gap in seconds treated as zero intensity
    #[arg(long)]
    threshold: Option<u32>,

    /// Search keyword
    #[arg(long)]
    keyword: Option<String>,

    /// OSC receiver host
    #[arg(long)]
    osc_host: Option<String>,

    /// OSC receiver port
    #[arg(long)]
    osc_port: Option<u16>,

    /// Search API client id
    #[arg(long)]
    twitter_client_id: Option<String>,

    /// Search API client secret
    #[arg(long)]
    twitter_client_secret: Option<String>,
}

impl Overrides {
    fn resolve(self) -> anyhow::Result<Config> {
        let mut config = match self.config {
            Some(ref path) => Config::load_from(path)
                .with_context(|| format!("Failed to load config from {path:?}"))?,
            None => Config::load().context("Failed to load config")?,
        };

        if let Some(threshold) = self.threshold {
            config.threshold_secs = threshold;
        }
        if let Some(keyword) = self.keyword {
            config.keyword = keyword;
        }
        if let Some(host) = self.osc_host {
            config.osc_host = host;
        }
        if let Some(port) = self.osc_port {
            config.osc_port = port;
        }
        if let Some(id) = self.twitter_client_id {
            config.twitter_client_id = id;
        }
        if let Some(secret) = self.twitter_client_secret {
            config.twitter_client_secret = secret;
        }

        config.validate()?;
        Ok(config)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start {
            overrides,
            log_level,
            log_json,
        } => {
            init_logging(&log_level, log_json);
            cmd_start(overrides.resolve()?).await
        }
        Commands::Config { overrides } => cmd_config(overrides.resolve()?),
        Commands::Estimate {
            threshold,
            timestamps,
        } => {
            init_logging("warn", false);
            cmd_estimate(threshold, &timestamps)
        }
    }
}

async fn cmd_start(config: Config) -> anyhow::Result<()> {
    tracing::info!(version = VERSION, config = %config.summary(), "Initializing");

    let source = TwitterClient::new(TwitterConfig::new(
        &config.api_base_url,
        &config.twitter_client_id,
        &config.twitter_client_secret,
    ))?;
    let transport = OscTransport::bind(&config.osc_host, config.osc_port)
        .await
        .context("Failed to open OSC socket")?;

    let controller = Arc::new(ShutdownController::new());
    ctrlc_handler(Arc::clone(&controller))?;

    let handle = Engine::new(&config, Arc::new(source), Arc::new(transport))
        .start(controller.signal());

    handle.join().await?;
    tracing::info!("Stopped");
    Ok(())
}

fn cmd_config(config: Config) -> anyhow::Result<()> {
    println!("Config file: {:?}", Config::config_path());
    println!();
    println!("{}", config.to_display_json()?);
    Ok(())
}

fn cmd_estimate(threshold: u32, timestamps: &[String]) -> anyhow::Result<()> {
    anyhow::ensure!(threshold > 0, "threshold must be positive");

    let parsed = timestamps
        .iter()
        .map(|s| {
            DateTime::parse_from_rfc3339(s)
                .map(|dt| dt.with_timezone(&Utc))
                .with_context(|| format!("Invalid timestamp '{s}'"))
        })
        .collect::<anyhow::Result<Vec<_>>>()?;

    let estimate = IntensityEstimator::new(threshold).estimate(&parsed)?;

    println!("Events:        {}", estimate.stats.events);
    println!("Mean gap:      {:.3}s", estimate.stats.avg_gap_secs);
    println!("Gap std dev:   {:.3}s", estimate.stats.gap_std_dev_secs);
    println!("Ratio:         {:.3}", estimate.stats.ratio);
    if estimate.reordered {
        println!("Order:         reversed (input was oldest-first)");
    }
    println!("Intensity:     {}", estimate.intensity);
    Ok(())
}

/// Set up Ctrl+C handler.
fn ctrlc_handler(controller: Arc<ShutdownController>) -> anyhow::Result<()> {
    ctrlc::set_handler(move || {
        if controller.shutdown() {
            tracing::info!("Interrupt received, shutting down");
        }
    })
    .context("Error setting Ctrl+C handler")
}
