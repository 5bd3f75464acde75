//! Error handling for Fedgate.
//!
//! Error messages are designed to be informative for operators while not
//! exposing protocol internals to end users.

use thiserror::Error;

/// Result type alias using the Fedgate error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for Fedgate operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Session storage error.
    #[error("session error: {0}")]
    Session(String),

    /// Authentication error.
    ///
    /// Uses a generic message to prevent user enumeration.
    #[error("authentication failed")]
    Authentication,

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("resource not found: {0}")]
    NotFound(String),

    /// Internal error.
    #[error("internal error")]
    Internal,
}

impl Error {
    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(self, Self::Session(_) | Self::Internal)
    }

    /// Returns whether this error represents a client error.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::Authentication | Self::Validation(_) | Self::NotFound(_)
        )
    }
}
