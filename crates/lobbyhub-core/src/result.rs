//! Convenience result type alias for LobbyHub.

use crate::error::AppError;

/// A specialized `Result` type for LobbyHub operations.
pub type AppResult<T> = Result<T, AppError>;
