//! Lobby identifiers, slot roles and occupancy states.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// Caller-supplied lobby key. Any integer is accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LobbyId(pub i64);

impl LobbyId {
    /// Parse the raw identifier taken from the connection request.
    ///
    /// Accepts an optional sign followed by decimal digits. Missing,
    /// empty, non-numeric or out-of-range values are rejected.
    pub fn parse(raw: Option<&str>) -> Result<Self, RelayError> {
        raw.and_then(|value| value.parse::<i64>().ok())
            .map(Self)
            .ok_or(RelayError::InvalidLobbyId)
    }
}

impl fmt::Display for LobbyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Which of the two interchangeable slots a session occupies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// First slot, taken by the earlier arrival when both are free.
    SlotA,
    /// Second slot.
    SlotB,
}

impl Role {
    /// The opponent's slot.
    pub fn other(self) -> Self {
        match self {
            Self::SlotA => Self::SlotB,
            Self::SlotB => Self::SlotA,
        }
    }

    /// Get the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SlotA => "slot_a",
            Self::SlotB => "slot_b",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Occupancy state of a lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LobbyStatus {
    /// No occupants; eligible for reclamation.
    Empty,
    /// Exactly one slot filled.
    OneOccupant,
    /// Both slots filled.
    Full,
}

impl LobbyStatus {
    /// State for a given number of occupied slots.
    pub fn from_occupants(count: usize) -> Self {
        match count {
            0 => Self::Empty,
            1 => Self::OneOccupant,
            _ => Self::Full,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_lobby_id() {
        assert_eq!(LobbyId::parse(Some("42")), Ok(LobbyId(42)));
        assert_eq!(LobbyId::parse(Some("-7")), Ok(LobbyId(-7)));
        assert_eq!(LobbyId::parse(Some("+7")), Ok(LobbyId(7)));
    }

    #[test]
    fn test_parse_lobby_id_rejects_garbage() {
        for raw in [None, Some(""), Some("abc"), Some("4.2"), Some(" 42"), Some("99999999999999999999")] {
            assert_eq!(LobbyId::parse(raw), Err(RelayError::InvalidLobbyId), "{raw:?}");
        }
    }

    #[test]
    fn test_role_other() {
        assert_eq!(Role::SlotA.other(), Role::SlotB);
        assert_eq!(Role::SlotB.other(), Role::SlotA);
    }
}
