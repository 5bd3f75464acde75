//! Session error types.

use thiserror::Error;

/// Result type for session operations.
pub type SessionResult<T> = Result<T, SessionError>;

/// Errors from session storage and the session-bound caches.
#[derive(Debug, Error)]
pub enum SessionError {
    /// A request identifier was recorded twice.
    ///
    /// An outstanding query is never silently overwritten; issuing the same
    /// identifier again is refused.
    #[error("duplicate outstanding request id: {0}")]
    DuplicateRequestId(String),
}
