//! Redirect gateway (v1)
//!
//! An HTTP front that applies redirect rules before traffic reaches the origin.
//!
//! # Architecture Overview
//!
//! ```text
//!                  ┌───────────────────────────────────────────────┐
//!                  │               REDIRECT GATEWAY                │
//!                  │                                               │
//!  Client Request  │  ┌─────────┐    ┌────────────┐    ┌────────┐  │
//!  ────────────────┼─▶│  http   │───▶│  routing   │───▶│ match? │  │
//!                  │  │ server  │    │ Redirector │    └───┬────┘  │
//!                  │  └─────────┘    └────────────┘        │       │
//!                  │                          yes ┌────────┴─┐ no  │
//!  Redirect (3xx)  │                              ▼          ▼     │
//!  ◀───────────────┼─────────────────── response   pass-through ──┼──▶ Upstream
//!                  │                                               │
//!                  │  config · lifecycle · observability           │
//!                  └───────────────────────────────────────────────┘
//! ```

use std::path::PathBuf;

use clap::Parser;

use redirect_gateway::config::{load_config, GatewayConfig};
use redirect_gateway::lifecycle::startup;
use redirect_gateway::observability::logging;

#[derive(Parser)]
#[command(name = "redirect-gateway")]
#[command(about = "HTTP gateway that applies redirect rules", long_about = None)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => GatewayConfig::default(),
    };

    logging::init(&config.observability);

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        config = ?args.config,
        bind_address = %config.listener.bind_address,
        rules = config.redirects.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "redirect-gateway starting"
    );

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
