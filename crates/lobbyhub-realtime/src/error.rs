//! Per-connection failure taxonomy.

use thiserror::Error;

/// Reasons a connection is terminated by the relay.
///
/// Every variant is local to one connection: the registry and the lobby
/// are left structurally valid whichever path triggered it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RelayError {
    /// The lobby identifier was missing or not an integer.
    #[error("invalid lobby id")]
    InvalidLobbyId,
    /// Both slots of the target lobby were occupied.
    #[error("lobby is full")]
    LobbyFull,
    /// A non-text frame was received while bound to a slot.
    #[error("non-text frame received")]
    ProtocolViolation,
    /// The channel was closed or failed while bound to a slot.
    #[error("peer disconnected")]
    PeerDisconnect,
}

impl RelayError {
    /// Message carried by the `9|<message>` frame sent before closing,
    /// if this termination path reports one to the client.
    pub fn wire_message(&self) -> Option<&'static str> {
        match self {
            Self::InvalidLobbyId => Some("Invalid Lobby ID"),
            Self::LobbyFull => Some("Lobby Full"),
            Self::ProtocolViolation => Some("Packet Error"),
            Self::PeerDisconnect => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_messages() {
        assert_eq!(RelayError::InvalidLobbyId.wire_message(), Some("Invalid Lobby ID"));
        assert_eq!(RelayError::LobbyFull.wire_message(), Some("Lobby Full"));
        assert_eq!(RelayError::ProtocolViolation.wire_message(), Some("Packet Error"));
        assert_eq!(RelayError::PeerDisconnect.wire_message(), None);
    }
}
