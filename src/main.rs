//! Billing Adapter
//!
//! Exposes `login` and `register` JSON endpoints and translates each into
//! calls against an upstream billing API.
//!
//! # Architecture Overview
//!
//! ```text
//!                    ┌──────────────────────────────────────────────────┐
//!                    │                 BILLING ADAPTER                   │
//!                    │                                                   │
//!   POST /login      │  ┌─────────┐    ┌──────────────┐    ┌──────────┐  │
//!   POST /register ──┼─▶│  http   │───▶│   adapter    │───▶│ upstream │──┼──▶ Billing API
//!                    │  │ server  │    │   service    │    │  client  │  │    (HTTPS form POST)
//!   JSON envelope  ◀─┼──│         │◀───│              │◀───│          │◀─┼───
//!                    │  └─────────┘    └──────────────┘    └──────────┘  │
//!                    │                                                   │
//!                    │  config · observability · lifecycle               │
//!                    └──────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use billing_adapter::config::{load_config, load_default};
use billing_adapter::lifecycle::startup;
use billing_adapter::observability::logging::init_logging;

#[derive(Parser)]
#[command(name = "billing-adapter")]
#[command(about = "JSON login/registration adapter for an upstream billing API", long_about = None)]
struct Cli {
    /// Path to a TOML configuration file. Defaults plus environment overrides when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => load_default()?,
    };

    init_logging(&config.observability)?;

    tracing::info!("billing-adapter v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.url,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
