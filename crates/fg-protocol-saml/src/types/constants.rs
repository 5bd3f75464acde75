//! SAML constants: namespaces, binding URIs, identifier and time formats.

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// SAML 2.0 assertion namespace.
pub const NS_SAML_ASSERTION: &str = "urn:oasis:names:tc:SAML:2.0:assertion";

/// SAML 2.0 protocol namespace.
pub const NS_SAML_PROTOCOL: &str = "urn:oasis:names:tc:SAML:2.0:protocol";

/// SAML 2.0 metadata namespace.
pub const NS_SAML_METADATA: &str = "urn:oasis:names:tc:SAML:2.0:metadata";

/// XML digital signature namespace.
pub const NS_XMLDSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML encryption namespace.
pub const NS_XMLENC: &str = "http://www.w3.org/2001/04/xmlenc#";

/// Unspecified NameID format.
pub const NAMEID_FORMAT_UNSPECIFIED: &str = "urn:oasis:names:tc:SAML:1.1:nameid-format:unspecified";

/// SAML transport binding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlBinding {
    /// HTTP-POST binding: base64 message in an HTML form field.
    HttpPost,
    /// HTTP-Redirect binding: deflated, base64- and URL-encoded message in
    /// query parameters.
    HttpRedirect,
}

impl SamlBinding {
    /// Returns the binding URI.
    #[must_use]
    pub const fn uri(&self) -> &'static str {
        match self {
            Self::HttpPost => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-POST",
            Self::HttpRedirect => "urn:oasis:names:tc:SAML:2.0:bindings:HTTP-Redirect",
        }
    }
}

/// Generates a schema-valid SAML message identifier.
///
/// XML IDs must not start with a digit, hence the leading underscore.
#[must_use]
pub fn saml_message_id() -> String {
    format!("_{}", Uuid::new_v4().simple())
}

/// Formats a timestamp the way SAML documents expect.
#[must_use]
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_ids_are_unique_and_schema_valid() {
        let a = saml_message_id();
        let b = saml_message_id();
        assert_ne!(a, b);
        assert!(a.starts_with('_'));
        assert_eq!(a.len(), 33);
    }

    #[test]
    fn binding_uris() {
        assert!(SamlBinding::HttpPost.uri().ends_with("HTTP-POST"));
        assert!(SamlBinding::HttpRedirect.uri().ends_with("HTTP-Redirect"));
    }
}
