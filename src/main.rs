//! Avatar proxy.
//!
//! A single-endpoint service built with Tokio and Axum that turns avatar
//! generator query strings into downloadable PNGs.
//!
//! # Architecture Overview
//!
//! ```text
//!                     ┌───────────────────────────────────────────────────┐
//!                     │                   AVATAR PROXY                     │
//!    Client Request   │  ┌──────────┐    ┌───────────┐    ┌────────────┐  │
//!    ─────────────────┼─▶│  http    │───▶│  avatar   │───▶│  upstream  │──┼──▶ Avatar
//!                     │  │  server  │    │  handler  │    │  client    │◀─┼─── generator
//!                     │  └──────────┘    └─────┬─────┘    └────────────┘  │     (SVG)
//!                     │                        │                          │
//!                     │                        ▼                          │
//!    Client Response  │                  ┌───────────┐                    │
//!    ◀────────────────┼──────────────────│  raster   │                    │
//!     PNG or SVG      │                  │ (resvg)   │                    │
//!                     │                  └───────────┘                    │
//!                     │  config · observability · lifecycle               │
//!                     └───────────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;
use tokio::net::TcpListener;

use avatar_proxy::config::{load_config, validate_config, ConfigError, ProxyConfig};
use avatar_proxy::http::HttpServer;
use avatar_proxy::lifecycle::{signals, Shutdown};
use avatar_proxy::observability::{logging, metrics};

#[derive(Parser)]
#[command(name = "avatar-proxy")]
#[command(about = "Proxy that serves generated avatars as PNG", long_about = None)]
struct Cli {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override `listener.bind_address`.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => ProxyConfig::default(),
    };
    if let Some(bind) = cli.bind {
        config.listener.bind_address = bind;
    }
    validate_config(&config).map_err(ConfigError::Validation)?;

    logging::init(&config.observability);
    tracing::info!("avatar-proxy v{} starting", env!("CARGO_PKG_VERSION"));

    tracing::info!(
        bind_address = %config.listener.bind_address,
        upstream = %config.upstream.base_url,
        default_size = config.raster.default_size,
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        // address already checked by validate_config
        if let Ok(addr) = config.observability.metrics_address.parse() {
            metrics::init_metrics(addr);
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    let shutdown = Shutdown::new();
    let server = HttpServer::new(config)?;
    let server_task = tokio::spawn(server.run(listener, shutdown.subscribe()));

    signals::wait_for_signal().await;
    shutdown.trigger();
    server_task.await??;

    tracing::info!("Shutdown complete");
    Ok(())
}
