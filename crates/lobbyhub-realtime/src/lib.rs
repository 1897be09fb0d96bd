//! # lobbyhub-realtime
//!
//! Real-time pairing engine for LobbyHub. Provides:
//!
//! - Pipe-delimited wire frames (`4|1`, `4|0`, `9|<message>`)
//! - Connection handles with a serialized per-connection write queue
//! - Two-slot lobbies with presence notifications
//! - A concurrent lobby registry with atomic join and sweep
//! - The per-connection session relay loop
//! - A cancellable reaper that reclaims empty lobbies

pub mod connection;
pub mod error;
pub mod frame;
pub mod lobby;
pub mod metrics;
pub mod reaper;
pub mod server;
pub mod session;
pub mod shutdown;

pub use connection::handle::ConnectionHandle;
pub use error::RelayError;
pub use frame::{Frame, InboundFrame, OutboundFrame};
pub use lobby::registry::LobbyRegistry;
pub use reaper::Reaper;
pub use server::RelayEngine;
pub use session::Session;
