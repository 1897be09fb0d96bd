//! Route definitions for the LobbyHub HTTP server.

use axum::Router;
use axum::routing::get;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware::cors::build_cors_layer;
use crate::state::AppState;

/// Build the complete Axum router.
///
/// The WebSocket endpoint and `/api` routes take precedence over static
/// assets, which are only mounted when `server.static_dir` is set.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/stats", get(handlers::health::stats));

    let mut router = Router::new()
        .route(&state.config.relay.ws_path, get(handlers::ws::ws_upgrade))
        .nest("/api", api_routes);

    if let Some(dir) = &state.config.server.static_dir {
        tracing::info!(dir = %dir, "Serving static assets");
        router = router.fallback_service(ServeDir::new(dir));
    }

    let cors = build_cors_layer(&state.config.server.cors);

    router
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
