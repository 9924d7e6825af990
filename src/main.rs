//! # Actor features app
//!
//! Entry point for the actor features conformance app.
//!
//! ## Startup
//!
//! 1. **Tracing** - `RUST_LOG` filter, falling back to a debug level for this app
//! 2. **Configuration** - flags and `APP_PORT` / `DAPR_HTTP_PORT`
//! 3. **Axum server** - sidecar callbacks and test driver routes
//!
//! ## Shutdown
//!
//! SIGTERM/SIGINT drain in-flight requests for one second. A test driver
//! request to `/test/shutdown` ends the process with a failure status.

#![forbid(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![forbid(clippy::panic)]
#![deny(clippy::expect_used)]

mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use cli::Cli;

const DEFAULT_LOG_FILTER: &str = "info,actorfeatures=debug,actorfeatures_web=debug,tower_http=debug";

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();
    let config = cli.harness_config();
    info!(
        bind_address = %config.bind_address,
        sidecar = %config.sidecar_base_url,
        "Actor features app starting"
    );

    actorfeatures_web::run_server(config)
        .await
        .context("Actor features app stopped")?;

    info!("Shutdown complete");
    Ok(())
}

/// Initialize tracing subscriber.
fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}
