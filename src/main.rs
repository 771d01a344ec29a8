//! FAIF gateway.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client Request
//!     ─────────────▶ http server ──▶ lifecycle hook ──▶ route handler ──▶ upstream client ──▶ Government API
//!                         │               │                  │
//!                         │               │                  └─ normalize / fallback
//!                         │               ├─ request counters (health)
//!                         │               └─ audit recorder ──▶ writer task ──▶ audit store
//!     Client Response     │
//!     ◀───────────────────┘  {"ok": true, "data": ...} or {"ok": false, "error": {...}}
//! ```

use std::path::PathBuf;

use clap::Parser;

use faif_gateway::config::load_config;
use faif_gateway::lifecycle::{bind_listener, wait_for_signal, Shutdown};
use faif_gateway::observability::{logging, metrics};
use faif_gateway::HttpServer;

#[derive(Parser)]
#[command(name = "faif-gateway", version, about = "Aggregation gateway for Brazilian government APIs")]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let config = load_config(args.config.as_deref())?;

    logging::init_tracing(&config.observability);

    tracing::info!(app_version = %config.app_version, "faif-gateway starting");
    tracing::info!(
        bind_address = %config.listener.bind_address,
        request_timeout_secs = config.timeouts.request_secs,
        upstream_timeout_secs = config.upstream.timeout_secs,
        audit_store = ?config.audit.store,
        portal_api_key_present = config.upstream.portal_api_key.is_some(),
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = bind_listener(&config.listener.bind_address).await?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    let server = HttpServer::new(config).await?;

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_signal().await;
        signal_shutdown.trigger();
    });

    server.run(listener, server_shutdown).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
