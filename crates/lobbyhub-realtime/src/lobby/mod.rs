//! Two-slot lobbies and the registry that owns them.

pub mod lobby;
pub mod registry;
pub mod types;

pub use lobby::Lobby;
pub use registry::LobbyRegistry;
pub use types::{LobbyId, LobbyStatus, Role};
