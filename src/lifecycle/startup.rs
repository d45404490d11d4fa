//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (metrics exporter, signal listener)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: upstream client and bind errors are fatal
//! - Metrics exporter failure is logged, not fatal
//! - Listener starts last (traffic only when ready)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::AdapterConfig;
use crate::http::HttpServer;
use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::signals::shutdown_on_signal;
use crate::observability::metrics;
use crate::upstream::TransportError;

/// Fatal startup failures.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to initialize upstream client: {0}")]
    Upstream(#[from] TransportError),

    #[error("server I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Start every subsystem and serve until a termination signal arrives.
pub async fn run(config: AdapterConfig) -> Result<(), StartupError> {
    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => {
                if let Err(e) = metrics::init_metrics(addr) {
                    tracing::error!(error = %e, "Failed to start metrics exporter");
                }
            }
            Err(_) => {
                tracing::error!(
                    metrics_address = %config.observability.metrics_address,
                    "Failed to parse metrics address"
                );
            }
        }
    }

    let bind_address = config.listener.bind_address.clone();
    let server = HttpServer::new(config)?;

    let listener = TcpListener::bind(&bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(shutdown_on_signal(shutdown));

    server.run(listener, server_shutdown).await?;
    Ok(())
}
