//! HookRelay server
//!
//! Main binary: loads the configuration, connects to IRC, and serves the
//! webhook listeners until CTRL+C or SIGTERM.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Log filter (default: info)

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, ValueEnum};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use config_manager::{RelayConfig, DEFAULT_CONFIG_FILENAME};
use relay_api::{app::Relay, server::shutdown_signal};

#[cfg(test)]
#[path = "main_tests.rs"]
mod tests;

/// HookRelay: relay webhooks to IRC and Twitter
#[derive(Parser, Debug)]
#[command(name = "hookrelay", version)]
#[command(about = "Relay GitHub, Grafana and generic webhooks to IRC and Twitter", long_about = None)]
struct Cli {
    /// Path to the configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_FILENAME)]
    config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log_format);

    let config = RelayConfig::load(&cli.config)
        .with_context(|| format!("Failed to load configuration from {}", cli.config.display()))?;

    let relay = Relay::start(&config).await?;
    info!(
        address = %relay.local_addr(),
        version = env!("CARGO_PKG_VERSION"),
        "HookRelay started"
    );

    relay.run_until(shutdown_signal()).await
}
