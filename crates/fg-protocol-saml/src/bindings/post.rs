//! HTTP-POST Binding.
//!
//! The IdP delivers its authentication response as a base64-encoded form
//! field in a cross-origin browser POST. The SP side only decodes; encoding
//! an auto-submit form is the sender's job.

use base64::Engine;

use crate::error::{SpError, SpResult};

/// HTTP-POST binding decoder.
pub struct HttpPostBinding;

impl HttpPostBinding {
    /// Decodes a base64 form-field value back to XML.
    pub fn decode(encoded: &str) -> SpResult<String> {
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| SpError::Base64Decode(e.to_string()))?;

        String::from_utf8(decoded)
            .map_err(|e| SpError::Validation(format!("invalid UTF-8 in message: {e}")))
    }

    /// Encodes a message for embedding in a form field.
    ///
    /// Used by tests and by IdP simulators; the SP itself never posts.
    #[must_use]
    pub fn encode(xml: &str) -> String {
        base64::engine::general_purpose::STANDARD.encode(xml)
    }
}
