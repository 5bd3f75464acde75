//! HTTP-Redirect Binding.
//!
//! Messages travel in URL query parameters: DEFLATE-compressed (raw, no zlib
//! header), base64-encoded, then URL-encoded.

use base64::Engine;
use flate2::read::DeflateDecoder;
use flate2::write::DeflateEncoder;
use flate2::Compression;
use std::io::{Read, Write};

use crate::error::{SpError, SpResult};

use super::SamlMessageKind;

/// HTTP-Redirect binding encoder/decoder.
pub struct HttpRedirectBinding;

impl HttpRedirectBinding {
    /// Encodes a request, returning the full redirect URL.
    pub fn encode_request(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> SpResult<String> {
        Self::encode(xml, destination, relay_state, SamlMessageKind::Request)
    }

    /// Encodes a response, returning the full redirect URL.
    pub fn encode_response(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
    ) -> SpResult<String> {
        Self::encode(xml, destination, relay_state, SamlMessageKind::Response)
    }

    fn encode(
        xml: &str,
        destination: &str,
        relay_state: Option<&str>,
        kind: SamlMessageKind,
    ) -> SpResult<String> {
        let compressed = deflate_compress(xml.as_bytes())?;
        let encoded = base64::engine::general_purpose::STANDARD.encode(&compressed);
        let url_encoded = urlencoding::encode(&encoded);

        let separator = if destination.contains('?') { '&' } else { '?' };
        let mut url = format!("{}{}{}={}", destination, separator, kind.param(), url_encoded);

        if let Some(rs) = relay_state {
            url.push_str(&format!("&RelayState={}", urlencoding::encode(rs)));
        }

        Ok(url)
    }

    /// Decodes one message parameter value back to XML.
    ///
    /// The value may still carry URL encoding (decoding a second time is a
    /// no-op on plain base64 text, so values already decoded by the web
    /// framework pass through unchanged).
    pub fn decode(encoded: &str) -> SpResult<String> {
        let url_decoded = urlencoding::decode(encoded)
            .map_err(|e| SpError::Validation(format!("URL decode error: {e}")))?;

        let b64_decoded = base64::engine::general_purpose::STANDARD
            .decode(url_decoded.as_ref())
            .map_err(|e| SpError::Base64Decode(e.to_string()))?;

        let xml_bytes = deflate_decompress(&b64_decoded)?;

        String::from_utf8(xml_bytes)
            .map_err(|e| SpError::Validation(format!("invalid UTF-8 in message: {e}")))
    }

    /// Extracts and decodes a message from a full redirect URL.
    ///
    /// Returns the XML and the relay state, if any.
    pub fn decode_url(url: &str) -> SpResult<(String, Option<String>)> {
        let parsed = url::Url::parse(url)
            .map_err(|e| SpError::Validation(format!("invalid URL: {e}")))?;

        let mut message = None;
        let mut relay_state = None;

        for (key, value) in parsed.query_pairs() {
            match key.as_ref() {
                "SAMLRequest" | "SAMLResponse" => message = Some(value.to_string()),
                "RelayState" => relay_state = Some(value.to_string()),
                _ => {}
            }
        }

        let message = message.ok_or_else(|| {
            SpError::Validation("no SAMLRequest or SAMLResponse parameter".to_string())
        })?;

        // query_pairs already URL-decoded the value.
        let b64_decoded = base64::engine::general_purpose::STANDARD
            .decode(message.as_bytes())
            .map_err(|e| SpError::Base64Decode(e.to_string()))?;
        let xml_bytes = deflate_decompress(&b64_decoded)?;
        let xml = String::from_utf8(xml_bytes)
            .map_err(|e| SpError::Validation(format!("invalid UTF-8 in message: {e}")))?;

        Ok((xml, relay_state))
    }
}

/// Compresses data using raw DEFLATE (no zlib header).
fn deflate_compress(data: &[u8]) -> SpResult<Vec<u8>> {
    let mut encoder = DeflateEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .map_err(|e| SpError::Deflate(format!("compression error: {e}")))?;
    encoder
        .finish()
        .map_err(|e| SpError::Deflate(format!("compression finish error: {e}")))
}

/// Decompresses raw DEFLATE data.
fn deflate_decompress(data: &[u8]) -> SpResult<Vec<u8>> {
    let mut decoder = DeflateDecoder::new(data);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .map_err(|e| SpError::Deflate(format!("decompression error: {e}")))?;
    Ok(decompressed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_and_decode_request() {
        let xml = r#"<samlp:AuthnRequest ID="_r1">content</samlp:AuthnRequest>"#;
        let url =
            HttpRedirectBinding::encode_request(xml, "https://idp.example.com/sso", Some("/next"))
                .unwrap();

        assert!(url.starts_with("https://idp.example.com/sso?SAMLRequest="));
        assert!(url.contains("&RelayState=%2Fnext"));

        let (decoded, relay) = HttpRedirectBinding::decode_url(&url).unwrap();
        assert_eq!(decoded, xml);
        assert_eq!(relay.as_deref(), Some("/next"));
    }

    #[test]
    fn decode_accepts_already_url_decoded_values() {
        let xml = "<LogoutResponse/>";
        let url =
            HttpRedirectBinding::encode_response(xml, "https://sp.example.com/ls", None).unwrap();
        let (_, param) = url.split_once("SAMLResponse=").unwrap();

        // As received via an extractor that already URL-decoded the query.
        let decoded_param = urlencoding::decode(param).unwrap();
        assert_eq!(HttpRedirectBinding::decode(&decoded_param).unwrap(), xml);

        // And as received raw.
        assert_eq!(HttpRedirectBinding::decode(param).unwrap(), xml);
    }

    #[test]
    fn destination_with_existing_query_uses_ampersand() {
        let url = HttpRedirectBinding::encode_request(
            "<Test/>",
            "https://idp.example.com/sso?tenant=a",
            None,
        )
        .unwrap();
        assert!(url.contains("?tenant=a&SAMLRequest="));
    }

    #[test]
    fn garbage_payload_is_rejected() {
        assert!(HttpRedirectBinding::decode("!!!not-base64!!!").is_err());
        // Valid base64, but not DEFLATE data.
        let bogus = base64::engine::general_purpose::STANDARD.encode("plain text");
        assert!(matches!(
            HttpRedirectBinding::decode(&bogus),
            Err(SpError::Deflate(_))
        ));
    }
}
