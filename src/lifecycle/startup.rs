//! Startup orchestration.
//!
//! # Responsibilities
//! - Bind the listener from validated configuration
//! - Build the HTTP server (redirect table, upstream client)
//! - Serve until a termination signal arrives
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - Listener binds first (a busy port is reported before anything else)

use thiserror::Error;
use tokio::net::TcpListener;

use crate::config::GatewayConfig;
use crate::http::{HttpServer, ServerError};
use crate::lifecycle::Shutdown;

/// Error type for startup and serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Server(#[from] ServerError),

    #[error("server error: {0}")]
    Serve(#[source] std::io::Error),
}

/// Bind, build and serve until SIGINT/SIGTERM.
pub async fn run(config: GatewayConfig) -> Result<(), StartupError> {
    let address = config.listener.bind_address.clone();
    let listener = TcpListener::bind(&address)
        .await
        .map_err(|source| StartupError::Bind { address, source })?;

    let server = HttpServer::new(config)?;

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    shutdown.trigger_on_signal();

    server
        .run(listener, server_shutdown)
        .await
        .map_err(StartupError::Serve)
}
