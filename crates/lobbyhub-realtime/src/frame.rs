//! Wire frames exchanged with clients.
//!
//! Control frames are UTF-8 text of the form `<type>|<payload>` where
//! `<type>` is a single integer code. Application payloads are never
//! wrapped: they travel as the exact text the peer sent.

use std::fmt;

/// Type code of presence frames.
pub const PRESENCE_CODE: u8 = 4;
/// Type code of error frames.
pub const ERROR_CODE: u8 = 9;

const DELIMITER: char = '|';

/// Opponent presence carried by a `4|…` frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// `4|0`
    Disconnected,
    /// `4|1`
    Connected,
}

/// Control frame emitted by the relay itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Opponent connected, reaffirmed, or disconnected.
    Presence(Presence),
    /// Human-readable error; always followed by channel closure.
    Error(String),
}

impl Frame {
    /// `4|1`
    pub fn joined() -> Self {
        Self::Presence(Presence::Connected)
    }

    /// `4|0`
    pub fn left() -> Self {
        Self::Presence(Presence::Disconnected)
    }

    /// `9|<message>`
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error(message.into())
    }

    /// Encode to the text sent on the wire.
    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Presence(Presence::Connected) => write!(f, "{PRESENCE_CODE}{DELIMITER}1"),
            Self::Presence(Presence::Disconnected) => write!(f, "{PRESENCE_CODE}{DELIMITER}0"),
            Self::Error(message) => write!(f, "{ERROR_CODE}{DELIMITER}{message}"),
        }
    }
}

/// A frame received from a client channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundFrame {
    /// A text message: an opaque application payload.
    Text(String),
    /// Any non-text data message.
    Binary(Vec<u8>),
}

/// A write queued for a client channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundFrame {
    /// Send a text message.
    Text(String),
    /// Close the channel. Nothing queued after this is written.
    Close,
}

impl From<Frame> for OutboundFrame {
    fn from(frame: Frame) -> Self {
        Self::Text(frame.encode())
    }
}
