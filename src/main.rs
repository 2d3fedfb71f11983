//! Gateway binary entry point.
//!
//! Loads configuration, initializes logging and metrics, builds the
//! gateway, and serves until SIGTERM or ctrl-c.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use doc_gateway::config::loader::load_config;
use doc_gateway::lifecycle::{signals, Shutdown};
use doc_gateway::observability;
use doc_gateway::{GatewayConfig, GatewayServer};

#[derive(Debug, Parser)]
#[command(name = "doc-gateway", about = "API gateway for the document platform")]
struct Args {
    /// Path to the TOML configuration file.
    #[arg(long, default_value = "gateway.toml")]
    config: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = if args.config.exists() {
        load_config(&args.config)?
    } else {
        GatewayConfig::default()
    };

    observability::logging::init(&config.observability.log_level);

    if !args.config.exists() {
        tracing::warn!(path = %args.config.display(), "config file not found, using defaults");
    }

    tracing::info!(
        bind_address = %config.listener.bind_address,
        services = config.services.len(),
        routes = config.routes.len(),
        public_paths = config.public_paths.len(),
        "configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => observability::metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let shutdown_rx = shutdown.subscribe();
    tokio::spawn(async move {
        signals::shutdown_signal().await;
        shutdown.trigger();
    });

    let server = GatewayServer::new(config)?;
    server.run(listener, shutdown_rx).await?;

    tracing::info!("shutdown complete");
    Ok(())
}
