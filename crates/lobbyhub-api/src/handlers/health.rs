//! Health and stats handlers.

use axum::Json;
use axum::extract::State;

use crate::dto::response::{ApiResponse, HealthResponse, StatsResponse};
use crate::state::AppState;

/// GET /api/health
pub async fn health(State(state): State<AppState>) -> Json<ApiResponse<HealthResponse>> {
    let status = if state.relay.is_shutting_down() {
        "shutting_down"
    } else {
        "ok"
    };

    Json(ApiResponse::ok(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.relay.uptime().as_secs(),
    }))
}

/// GET /api/stats
pub async fn stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    Json(ApiResponse::ok(StatsResponse {
        lobbies: state.relay.registry.snapshot(),
        metrics: state.relay.metrics.snapshot(),
    }))
}
