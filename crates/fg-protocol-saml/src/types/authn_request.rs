//! SAML AuthnRequest construction.
//!
//! The SP side only builds these; parsing inbound AuthnRequests is an IdP
//! concern.

use chrono::{DateTime, Utc};

use super::constants::{format_instant, saml_message_id, NS_SAML_ASSERTION, NS_SAML_PROTOCOL};
use crate::xmlns;

/// A SAML authentication request addressed to an identity provider.
#[derive(Debug, Clone)]
pub struct AuthnRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the requesting SP.
    pub issuer: String,

    /// The IdP SSO endpoint this request is sent to.
    pub destination: String,

    /// Where the IdP should post its response.
    pub assertion_consumer_service_url: String,

    /// Whether the IdP must re-authenticate the user.
    pub force_authn: bool,

    /// Whether the IdP may interact with the user.
    pub is_passive: bool,
}

impl AuthnRequest {
    /// Creates a new request with a generated identifier.
    #[must_use]
    pub fn new(
        issuer: impl Into<String>,
        acs_url: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        Self {
            id: saml_message_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: destination.into(),
            assertion_consumer_service_url: acs_url.into(),
            force_authn: false,
            is_passive: false,
        }
    }

    /// Requires the IdP to re-authenticate the user.
    #[must_use]
    pub const fn with_force_authn(mut self, force: bool) -> Self {
        self.force_authn = force;
        self
    }

    /// Serializes the request to XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let samlp = xmlns::prefix_for(NS_SAML_PROTOCOL);
        let saml = xmlns::prefix_for(NS_SAML_ASSERTION);
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<{samlp}:AuthnRequest xmlns:{samlp}="{protocol_ns}" xmlns:{saml}="{assertion_ns}" ID="{id}" Version="2.0" IssueInstant="{instant}" Destination="{destination}" AssertionConsumerServiceURL="{acs}" ProtocolBinding="urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST" ForceAuthn="{force}" IsPassive="{passive}">
<{saml}:Issuer>{issuer}</{saml}:Issuer>
</{samlp}:AuthnRequest>"#,
            samlp = samlp,
            saml = saml,
            protocol_ns = NS_SAML_PROTOCOL,
            assertion_ns = NS_SAML_ASSERTION,
            id = self.id,
            instant = format_instant(self.issue_instant),
            destination = self.destination,
            acs = self.assertion_consumer_service_url,
            force = self.force_authn,
            passive = self.is_passive,
            issuer = self.issuer,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serialization_carries_required_attributes() {
        let request = AuthnRequest::new(
            "https://sp.example.com/saml2/metadata",
            "https://sp.example.com/saml2/acs",
            "https://idp.example.com/sso",
        );
        let xml = request.to_xml();

        assert!(xml.contains(&format!(r#"ID="{}""#, request.id)));
        assert!(xml.contains(r#"Destination="https://idp.example.com/sso""#));
        assert!(xml.contains(r#"AssertionConsumerServiceURL="https://sp.example.com/saml2/acs""#));
        assert!(xml.contains("<saml:Issuer>https://sp.example.com/saml2/metadata</saml:Issuer>"));
        assert!(xml.contains(r#"Version="2.0""#));
    }

    #[test]
    fn force_authn_is_reflected() {
        let request = AuthnRequest::new("sp", "acs", "dest").with_force_authn(true);
        assert!(request.to_xml().contains(r#"ForceAuthn="true""#));
    }
}
