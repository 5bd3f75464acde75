//! The protocol-engine seam.
//!
//! The endpoint controllers never construct or validate SAML messages
//! themselves; they delegate to a [`SamlEngine`] and act on its outcomes.
//! The engine is the sole authority on solicitation-matching and message
//! validity. Everything it wants to remember between requests lives in the
//! opaque [`ProtocolStateBlob`] the caller persists for it.
//!
//! All engine calls are in-process, blocking computation from the caller's
//! point of view; the async signatures exist so implementations are free to
//! do their own I/O (e.g. metadata refresh) without changing the seam.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use fg_session::ProtocolStateBlob;

use crate::error::SpResult;

/// The redirect leg produced for a new authentication request.
#[derive(Debug, Clone)]
pub struct PreparedAuthn {
    /// Correlation identifier of the issued request.
    pub request_id: String,

    /// Where to send the browser.
    pub location: String,
}

/// What a validated authentication response asserts about the subject.
#[derive(Debug, Clone)]
pub struct SessionInfo {
    /// The IdP-asserted name identifier.
    pub name_id: String,

    /// Entity ID of the asserting identity provider.
    pub issuer: String,

    /// Asserted attributes, name to list of values.
    pub attributes: HashMap<String, Vec<String>>,

    /// IdP session index, if assigned.
    pub session_index: Option<String>,

    /// Validity deadline of the cached identity, if asserted.
    pub not_on_or_after: Option<DateTime<Utc>>,
}

/// A successfully validated authentication response.
#[derive(Debug, Clone)]
pub struct ValidatedResponse {
    /// The request identifier this response answers; absent when the
    /// response was unsolicited.
    pub in_response_to: Option<String>,

    /// What the response asserts.
    pub session_info: SessionInfo,
}

/// Description of an HTTP response the engine wants sent or followed.
#[derive(Debug, Clone, Default)]
pub struct EngineHttpResponse {
    /// HTTP status code.
    pub status: u16,

    /// Header pairs.
    pub headers: Vec<(String, String)>,

    /// Response body.
    pub body: String,
}

impl EngineHttpResponse {
    /// Creates a redirect description.
    #[must_use]
    pub fn redirect(location: impl Into<String>) -> Self {
        Self {
            status: 302,
            headers: vec![("Location".to_string(), location.into())],
            body: String::new(),
        }
    }

    /// The `Location` header value, if present.
    ///
    /// The orchestration layer performs only this presence check on the
    /// engine's output shape; a missing target on a redirecting branch is a
    /// contract violation by the engine.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .iter()
            .find(|(name, _)| name.eq_ignore_ascii_case("location"))
            .map(|(_, value)| value.as_str())
    }
}

/// Outcome of a completed logout-response validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoutStatus {
    /// The IdP reported success; the local session may be cleared.
    Success,
    /// Any other status.
    Failed,
}

/// Outcome of processing an IdP-initiated logout request.
#[derive(Debug, Clone)]
pub struct LogoutRequestOutcome {
    /// The send-back leg to the IdP, if one could be built. May be present
    /// even on failure (a "soft failure" that still answers the IdP).
    pub response: Option<EngineHttpResponse>,

    /// Whether the local session should be terminated.
    pub success: bool,
}

/// The external SAML protocol engine.
#[async_trait]
pub trait SamlEngine: Send + Sync {
    /// Builds an authentication request for the resolved IdP using the
    /// redirect-binding transport.
    ///
    /// Fails with a configuration error when no single target IdP can be
    /// resolved.
    async fn prepare_authentication(
        &self,
        idp_entity_id: Option<&str>,
        relay_state: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<PreparedAuthn>;

    /// Validates an authentication response against the set of outstanding
    /// request identifiers.
    async fn process_response(
        &self,
        saml_response: &str,
        outstanding: &HashMap<String, String>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<ValidatedResponse>;

    /// Starts global logout for the subject, addressing the IdPs the subject
    /// authenticated through.
    async fn global_logout(
        &self,
        subject_id: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<EngineHttpResponse>;

    /// Validates the logout response completing an SP-initiated logout
    /// (redirect binding).
    async fn process_logout_response(
        &self,
        saml_response: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutStatus>;

    /// Processes an IdP-initiated logout request for the session's current
    /// subject (redirect binding).
    async fn process_logout_request(
        &self,
        saml_request: &str,
        relay_state: Option<&str>,
        subject_id: Option<&str>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutRequestOutcome>;

    /// Serializes this SP's entity descriptor, valid for the given number of
    /// hours.
    fn entity_descriptor(&self, valid_for_hours: u32) -> SpResult<String>;
}
