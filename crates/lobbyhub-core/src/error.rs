//! Process-level errors for LobbyHub.
//!
//! Per-connection failures never surface here; they end the one connection
//! they belong to. [`AppError`] covers startup, serving and HTTP refusals.

use std::fmt;
use thiserror::Error;

/// What went wrong, as reported to the log or an HTTP client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Configuration could not be loaded or merged.
    Configuration,
    /// Socket or file I/O failed.
    Io,
    /// The relay is shutting down and takes no new connections.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Io => write!(f, "IO"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// Error returned by LobbyHub startup and HTTP handlers.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// Category
    pub kind: ErrorKind,
    /// Message shown to the operator or client
    pub message: String,
    /// Underlying cause, if any
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Error without an underlying cause.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Error wrapping the failure that caused it.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// [`ErrorKind::ServiceUnavailable`]
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Io, format!("I/O error: {err}"), err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Invalid configuration: {err}"),
            err,
        )
    }
}
