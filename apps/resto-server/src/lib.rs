//! # Resto Server
//!
//! JSON API behind the POS and back-office pages.
//!
//! ## Module Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        resto-server                                     │
//! │                                                                         │
//! │  main.rs ────► init_tracing, ServerConfig::load, serve                  │
//! │                                                                         │
//! │  config.rs ──► RESTO_* environment variables                            │
//! │                                                                         │
//! │  auth.rs ────► JWT issue/validate, SessionContext, require_auth         │
//! │                                                                         │
//! │  state/ ─────► AppState { db, config, jwt, carts, revoked }             │
//! │                                                                         │
//! │  routes/ ────► one router per page area, nested under /api              │
//! │                                                                         │
//! │  error.rs ───► ApiError { code, message } + HTTP status mapping         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Startup Sequence
//! 1. Initialize tracing (logging)
//! 2. Load configuration from the environment
//! 3. Connect to the database and run migrations
//! 4. Build state and router
//! 5. Serve until Ctrl+C or SIGTERM

pub mod auth;
pub mod config;
pub mod error;
pub mod routes;
pub mod state;

use axum::Router;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

pub use config::ServerConfig;
pub use state::AppState;
use resto_db::{Database, DbConfig};

/// Builds the full application router for `state`.
pub fn build_router(state: AppState) -> Router {
    routes::router(state)
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=resto=trace` - Show trace for resto crates only
/// - Default: INFO, debug for resto crates
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,resto=debug,sqlx=warn"));

    tracing_subscriber::fmt().with_env_filter(filter).init();
}

/// Connects the database and serves the API until a shutdown signal.
pub async fn serve(config: ServerConfig) -> anyhow::Result<()> {
    if let Some(parent) = config.database_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    info!(db_path = ?config.database_path, "Database path determined");

    let db = Database::new(
        DbConfig::new(config.database_path.clone()).max_connections(config.db_max_connections),
    )
    .await?;
    info!("Database connected and migrations applied");

    if config.uses_dev_secret() {
        warn!("RESTO_JWT_SECRET is not set; using the development secret");
    }
    if config.bootstrap_pin.is_none() {
        info!("No bootstrap PIN configured; only staff PINs can log in");
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(db.clone(), config);
    let app = build_router(state);

    let listener = TcpListener::bind(bind_addr).await?;
    info!(addr = %bind_addr, "Resto server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    db.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!(error = %e, "Failed to listen for Ctrl+C");
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
                error!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl+C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
