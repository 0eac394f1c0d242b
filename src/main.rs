//! gopen-gateway binary.

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use gopen_gateway::config::load_config;
use gopen_gateway::observability::{logging, metrics};
use gopen_gateway::{HttpServer, Shutdown};

#[derive(Debug, Parser)]
#[command(name = "gopen-gateway", version, about = "API gateway with response aggregation")]
struct Args {
    /// Path to the JSON configuration document.
    #[arg(short, long, env = "GOPEN_CONFIG")]
    config: PathBuf,

    /// Log filter, overriding `observability.log-level`.
    #[arg(long)]
    log_level: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let mut config = load_config(&args.config)?;
    if let Some(level) = args.log_level {
        config.observability.log_level = level;
    }

    logging::init(&config.observability)?;
    tracing::info!(version = env!("CARGO_PKG_VERSION"), "gopen-gateway starting");

    tracing::info!(
        config = %args.config.display(),
        bind_address = %config.listener.bind_address,
        endpoints = config.endpoints.len(),
        middlewares = config.middlewares.len(),
        "Configuration loaded"
    );

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(_) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                "Failed to parse metrics address"
            ),
        }
    }

    let server = HttpServer::new(&config, Shutdown::new());
    server.run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
