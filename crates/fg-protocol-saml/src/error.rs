//! SP error types.
//!
//! One taxonomy covers the whole exchange: what the caller sent, what the
//! protocol engine decided, and what the engine's output failed to provide.

use thiserror::Error;

/// Result type for SP operations.
pub type SpResult<T> = Result<T, SpError>;

/// Errors arising while orchestrating an SSO/SLO exchange.
#[derive(Debug, Error)]
pub enum SpError {
    /// The identity-provider selection could not be resolved from
    /// configuration. Non-fatal; surfaces as a diagnostic page.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The request payload is missing or was rejected by the protocol
    /// engine. No session state is mutated.
    #[error("validation error: {0}")]
    Validation(String),

    /// The protocol message validated but no local principal could be
    /// resolved. Deliberately not a hard failure, to keep the browser flow
    /// alive.
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The engine's output lacks a field this layer depends on, e.g. a
    /// redirect target. Fatal for the request.
    #[error("protocol engine contract violation: {0}")]
    EngineContract(String),

    /// The request matched no expected parameter shape.
    #[error("not found")]
    NotFound,

    /// XML parsing error in a protocol message.
    #[error("XML parsing error: {0}")]
    XmlParse(String),

    /// Base64 decoding error in a binding payload.
    #[error("base64 decode error: {0}")]
    Base64Decode(String),

    /// Deflate decompression error in a redirect-binding payload.
    #[error("deflate error: {0}")]
    Deflate(String),

    /// Session storage error.
    #[error("session error: {0}")]
    Session(String),

    /// Internal error.
    #[error("internal error: {0}")]
    Internal(String),
}

impl SpError {
    /// Returns the HTTP status code for this error.
    ///
    /// Configuration and authentication failures deliberately map to 200:
    /// they terminate the exchange with a diagnostic page rather than an
    /// HTTP-level failure, keeping the browser flow alive.
    #[must_use]
    pub const fn http_status(&self) -> u16 {
        match self {
            Self::Configuration(_) | Self::Authentication(_) => 200,
            Self::Validation(_) | Self::XmlParse(_) | Self::Base64Decode(_) | Self::Deflate(_) => {
                400
            }
            Self::NotFound => 404,
            Self::EngineContract(_) | Self::Session(_) | Self::Internal(_) => 500,
        }
    }

    /// Whether the failure is logged at error (rather than warn) level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::EngineContract(_) | Self::Session(_) | Self::Internal(_) | Self::Authentication(_)
        )
    }
}

impl From<base64::DecodeError> for SpError {
    fn from(err: base64::DecodeError) -> Self {
        Self::Base64Decode(err.to_string())
    }
}

impl From<std::io::Error> for SpError {
    fn from(err: std::io::Error) -> Self {
        Self::Deflate(err.to_string())
    }
}

impl From<quick_xml::Error> for SpError {
    fn from(err: quick_xml::Error) -> Self {
        Self::XmlParse(err.to_string())
    }
}

impl From<fg_session::SessionError> for SpError {
    fn from(err: fg_session::SessionError) -> Self {
        Self::Session(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_status_mapping() {
        assert_eq!(SpError::Validation("x".into()).http_status(), 400);
        assert_eq!(SpError::NotFound.http_status(), 404);
        assert_eq!(SpError::Configuration("x".into()).http_status(), 200);
        assert_eq!(SpError::Authentication("x".into()).http_status(), 200);
        assert_eq!(SpError::EngineContract("x".into()).http_status(), 500);
    }

    #[test]
    fn authentication_failures_are_logged_as_errors() {
        assert!(SpError::Authentication("no principal".into()).is_server_error());
        assert!(!SpError::Validation("bad".into()).is_server_error());
    }
}
