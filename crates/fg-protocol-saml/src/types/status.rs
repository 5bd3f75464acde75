//! SAML status codes.

/// Top-level success status.
pub const STATUS_SUCCESS: &str = "urn:oasis:names:tc:SAML:2.0:status:Success";

/// The requester sent something the responder could not act on.
pub const STATUS_REQUESTER: &str = "urn:oasis:names:tc:SAML:2.0:status:Requester";

/// The responder failed to process an otherwise valid request.
pub const STATUS_RESPONDER: &str = "urn:oasis:names:tc:SAML:2.0:status:Responder";

/// Logout succeeded locally but could not be propagated everywhere.
pub const STATUS_PARTIAL_LOGOUT: &str = "urn:oasis:names:tc:SAML:2.0:status:PartialLogout";

/// Status of a SAML response message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    /// The top-level status code URI.
    pub code: String,
}

impl Status {
    /// Creates a success status.
    #[must_use]
    pub fn success() -> Self {
        Self {
            code: STATUS_SUCCESS.to_string(),
        }
    }

    /// Creates a requester-error status.
    #[must_use]
    pub fn requester() -> Self {
        Self {
            code: STATUS_REQUESTER.to_string(),
        }
    }

    /// Creates a status from a code URI.
    #[must_use]
    pub fn new(code: impl Into<String>) -> Self {
        Self { code: code.into() }
    }

    /// Whether this status indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.code == STATUS_SUCCESS
    }
}
