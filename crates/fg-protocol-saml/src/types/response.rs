//! SAML Response parsing.
//!
//! Extracts what the SP orchestration needs from an authentication response:
//! correlation identifier, status, subject, attributes and validity window.
//! Signature verification is not performed here.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::error::{SpError, SpResult};

/// The assertion carried by a response.
#[derive(Debug, Clone, Default)]
pub struct ParsedAssertion {
    /// The asserted name identifier.
    pub name_id: String,

    /// Session index assigned by the IdP, if any.
    pub session_index: Option<String>,

    /// Conditions deadline, if any.
    pub not_on_or_after: Option<DateTime<Utc>>,

    /// Restricted audience, if any.
    pub audience: Option<String>,

    /// Asserted attributes, name to list of values.
    pub attributes: HashMap<String, Vec<String>>,
}

/// A parsed authentication response.
#[derive(Debug, Clone)]
pub struct ParsedResponse {
    /// Unique identifier of the response.
    pub id: String,

    /// The request identifier this response answers, absent for unsolicited
    /// responses.
    pub in_response_to: Option<String>,

    /// The issuing entity.
    pub issuer: Option<String>,

    /// Top-level status code URI.
    pub status_code: String,

    /// The assertion, absent on error responses.
    pub assertion: Option<ParsedAssertion>,
}

/// Parses an authentication response document.
pub fn parse_response(xml: &str) -> SpResult<ParsedResponse> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut id = None;
    let mut in_response_to = None;
    let mut issuer: Option<String> = None;
    let mut status_code = None;

    let mut in_assertion = false;
    let mut assertion = ParsedAssertion::default();
    let mut seen_assertion = false;
    let mut current_attribute: Option<String> = None;
    let mut current_element = String::new();

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                current_element = local.clone();

                match local.as_str() {
                    "Response" => {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.local_name().into_inner())
                                .to_string();
                            let value = String::from_utf8_lossy(&attr.value).to_string();
                            match key.as_str() {
                                "ID" => id = Some(value),
                                "InResponseTo" => in_response_to = Some(value),
                                _ => {}
                            }
                        }
                    }
                    "StatusCode" => {
                        if status_code.is_none() {
                            for attr in e.attributes().flatten() {
                                let key =
                                    String::from_utf8_lossy(attr.key.local_name().into_inner())
                                        .to_string();
                                if key == "Value" {
                                    status_code =
                                        Some(String::from_utf8_lossy(&attr.value).to_string());
                                }
                            }
                        }
                    }
                    "Assertion" => {
                        in_assertion = true;
                        seen_assertion = true;
                    }
                    "Conditions" if in_assertion => {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.local_name().into_inner())
                                .to_string();
                            if key == "NotOnOrAfter" {
                                let raw = String::from_utf8_lossy(&attr.value).to_string();
                                assertion.not_on_or_after = parse_instant(&raw);
                            }
                        }
                    }
                    "AuthnStatement" if in_assertion => {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.local_name().into_inner())
                                .to_string();
                            if key == "SessionIndex" {
                                assertion.session_index =
                                    Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                    "Attribute" if in_assertion => {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.local_name().into_inner())
                                .to_string();
                            if key == "Name" {
                                let name = String::from_utf8_lossy(&attr.value).to_string();
                                assertion.attributes.entry(name.clone()).or_default();
                                current_attribute = Some(name);
                            }
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                let text = e.unescape().unwrap_or_default().to_string();
                match current_element.as_str() {
                    "Issuer" => {
                        // The response-level issuer comes first; the
                        // assertion repeats it.
                        if issuer.is_none() {
                            issuer = Some(text);
                        }
                    }
                    "NameID" if in_assertion => assertion.name_id = text,
                    "Audience" if in_assertion => assertion.audience = Some(text),
                    "AttributeValue" => {
                        if let Some(name) = &current_attribute {
                            assertion
                                .attributes
                                .entry(name.clone())
                                .or_default()
                                .push(text);
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::End(ref e)) => {
                let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                match local.as_str() {
                    "Assertion" => in_assertion = false,
                    "Attribute" => current_attribute = None,
                    _ => {}
                }
                current_element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(SpError::XmlParse(e.to_string())),
            _ => {}
        }
        buf.clear();
    }

    let id = id.ok_or_else(|| SpError::XmlParse("missing Response ID".to_string()))?;
    let status_code =
        status_code.ok_or_else(|| SpError::XmlParse("missing StatusCode".to_string()))?;

    let assertion = if seen_assertion {
        if assertion.name_id.is_empty() {
            return Err(SpError::XmlParse(
                "assertion carries no NameID".to_string(),
            ));
        }
        Some(assertion)
    } else {
        None
    };

    Ok(ParsedResponse {
        id,
        in_response_to,
        issuer,
        status_code,
        assertion,
    })
}

fn parse_instant(raw: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}
