//! LobbyHub Server: two-party lobby pairing and message relay
//!
//! Main entry point that wires all crates together and starts the server.

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt};

use lobbyhub_api::AppState;
use lobbyhub_core::config::AppConfig;
use lobbyhub_core::error::{AppError, ErrorKind};
use lobbyhub_core::result::AppResult;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> AppResult<AppConfig> {
    let env = std::env::var("LOBBYHUB_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting LobbyHub v{}", env!("CARGO_PKG_VERSION"));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let grace = Duration::from_secs(config.server.shutdown_grace_seconds);

    // ── Step 1: Relay engine + reaper ────────────────────────────
    let state = AppState::new(config);
    let engine = state.relay.clone();
    let reaper_handle = engine.spawn_reaper();

    // ── Step 2: Build and start HTTP server ──────────────────────
    let app = lobbyhub_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Io, format!("Failed to bind {addr}"), e))?;

    tracing::info!("LobbyHub server listening on {}", addr);

    // ── Step 3: Graceful shutdown ────────────────────────────────
    let shutdown_engine = engine.clone();
    let server = axum::serve(listener, app).with_graceful_shutdown(async move {
        shutdown_signal().await;
        tracing::info!("Shutdown signal received, starting graceful shutdown...");
        shutdown_engine.shutdown();
    });

    server.await?;

    // ── Step 4: Wait for background tasks ────────────────────────
    tracing::info!("Waiting for background tasks to complete...");
    if tokio::time::timeout(grace, reaper_handle).await.is_err() {
        tracing::warn!("Reaper did not stop within {:?}", grace);
    }

    tracing::info!("LobbyHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM)
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
