//! Application state shared across all handlers.

use std::sync::Arc;

use lobbyhub_core::config::AppConfig;
use lobbyhub_realtime::server::RelayEngine;

/// Application state passed to every Axum handler via `State<AppState>`.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Lobby relay engine
    pub relay: RelayEngine,
}

impl AppState {
    /// Builds the state, creating a relay engine from the configuration.
    pub fn new(config: AppConfig) -> Self {
        let relay = RelayEngine::new(config.relay.clone());
        Self {
            config: Arc::new(config),
            relay,
        }
    }
}
