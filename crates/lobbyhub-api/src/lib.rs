//! # lobbyhub-api
//!
//! HTTP layer for LobbyHub built on Axum.
//!
//! Provides the WebSocket upgrade endpoint that feeds the relay engine,
//! health and stats endpoints, optional static asset serving, CORS and
//! request tracing.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::build_router;
pub use state::AppState;
