//! # Address API
//!
//! HTTP server for addresses, customers and address templates.
//!
//! ## Architecture
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Address API Server                               │
//! │                                                                         │
//! │  Client ───► HTTP (8000) ───► routes ───► address-db ───► SQLite      │
//! │                                              │                          │
//! │                                              ▼                          │
//! │                                        address-core                     │
//! │                                   (rules, rendering)                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```bash
//! address-api                      # platform config file, if present
//! address-api ./address-api.toml   # explicit config file
//! RUST_LOG=address_db=debug address-api
//! ```

mod config;
mod error;
mod routes;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use address_db::Database;

use crate::config::ApiConfig;
use crate::routes::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    info!("Starting address API server...");

    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = ApiConfig::load(config_path).context("Failed to load configuration")?;
    info!(
        addr = %config.server.bind_address(),
        db = %config.database.path.display(),
        "Configuration loaded"
    );

    let db = Database::new(config.database.db_config())
        .await
        .context("Failed to open database")?;
    info!("Database ready");

    let state = Arc::new(AppState { db: db.clone() });
    let app = routes::router(state);

    let bind_addr = config.server.bind_address();
    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", bind_addr))?;
    info!(addr = %bind_addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(?e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(?e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
