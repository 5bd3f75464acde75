//! SAML Single Logout messages.
//!
//! The SP builds `LogoutRequest`s when it initiates logout and
//! `LogoutResponse`s when the IdP does; it parses the inbound counterparts of
//! both.

use chrono::{DateTime, Utc};
use quick_xml::events::Event;
use quick_xml::reader::Reader;

use super::constants::{format_instant, saml_message_id, NS_SAML_ASSERTION, NS_SAML_PROTOCOL};
use super::status::Status;
use crate::error::{SpError, SpResult};
use crate::xmlns;

/// A SAML logout request.
#[derive(Debug, Clone)]
pub struct LogoutRequest {
    /// Unique identifier for this request.
    pub id: String,

    /// Timestamp when this request was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the requester.
    pub issuer: String,

    /// The endpoint this request is sent to.
    pub destination: Option<String>,

    /// The name identifier of the principal to log out.
    pub name_id: String,

    /// Session index to terminate, if known.
    pub session_index: Option<String>,
}

impl LogoutRequest {
    /// Creates a new logout request with a generated identifier.
    #[must_use]
    pub fn new(issuer: impl Into<String>, name_id: impl Into<String>) -> Self {
        Self {
            id: saml_message_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            destination: None,
            name_id: name_id.into(),
            session_index: None,
        }
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Sets the session index to terminate.
    #[must_use]
    pub fn with_session_index(mut self, index: impl Into<String>) -> Self {
        self.session_index = Some(index.into());
        self
    }

    /// Serializes the request to XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let samlp = xmlns::prefix_for(NS_SAML_PROTOCOL);
        let saml = xmlns::prefix_for(NS_SAML_ASSERTION);
        let destination = self
            .destination
            .as_ref()
            .map(|d| format!(r#" Destination="{d}""#))
            .unwrap_or_default();
        let session_index = self
            .session_index
            .as_ref()
            .map(|si| format!("\n<{samlp}:SessionIndex>{si}</{samlp}:SessionIndex>"))
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<{samlp}:LogoutRequest xmlns:{samlp}="{protocol_ns}" xmlns:{saml}="{assertion_ns}" ID="{id}" Version="2.0" IssueInstant="{instant}"{destination}>
<{saml}:Issuer>{issuer}</{saml}:Issuer>
<{saml}:NameID>{name_id}</{saml}:NameID>{session_index}
</{samlp}:LogoutRequest>"#,
            samlp = samlp,
            saml = saml,
            protocol_ns = NS_SAML_PROTOCOL,
            assertion_ns = NS_SAML_ASSERTION,
            id = self.id,
            instant = format_instant(self.issue_instant),
            issuer = self.issuer,
            name_id = self.name_id,
        )
    }

    /// Parses a logout request from XML.
    pub fn parse(xml: &str) -> SpResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut id = None;
        let mut issuer = None;
        let mut name_id = None;
        let mut session_index = None;
        let mut current_element = String::new();

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                    current_element = local.clone();

                    if local == "LogoutRequest" {
                        for attr in e.attributes().flatten() {
                            let key = String::from_utf8_lossy(attr.key.local_name().into_inner())
                                .to_string();
                            if key == "ID" {
                                id = Some(String::from_utf8_lossy(&attr.value).to_string());
                            }
                        }
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    match current_element.as_str() {
                        "Issuer" => issuer = Some(text),
                        "NameID" => name_id = Some(text),
                        "SessionIndex" => session_index = Some(text),
                        _ => {}
                    }
                }
                Ok(Event::End(_)) => current_element.clear(),
                Ok(Event::Eof) => break,
                Err(e) => return Err(SpError::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            id: id.ok_or_else(|| SpError::XmlParse("missing LogoutRequest ID".to_string()))?,
            issue_instant: Utc::now(),
            issuer: issuer.ok_or_else(|| SpError::XmlParse("missing Issuer".to_string()))?,
            destination: None,
            name_id: name_id.ok_or_else(|| SpError::XmlParse("missing NameID".to_string()))?,
            session_index,
        })
    }
}

/// A SAML logout response.
#[derive(Debug, Clone)]
pub struct LogoutResponse {
    /// Unique identifier for this response.
    pub id: String,

    /// Timestamp when this response was issued.
    pub issue_instant: DateTime<Utc>,

    /// The entity ID of the responder.
    pub issuer: String,

    /// The ID of the request this response is for.
    pub in_response_to: Option<String>,

    /// The endpoint this response is sent to.
    pub destination: Option<String>,

    /// The status of the response.
    pub status: Status,
}

impl LogoutResponse {
    /// Creates a success response with a generated identifier.
    #[must_use]
    pub fn success(issuer: impl Into<String>) -> Self {
        Self::with_status(issuer, Status::success())
    }

    /// Creates a response with the given status.
    #[must_use]
    pub fn with_status(issuer: impl Into<String>, status: Status) -> Self {
        Self {
            id: saml_message_id(),
            issue_instant: Utc::now(),
            issuer: issuer.into(),
            in_response_to: None,
            destination: None,
            status,
        }
    }

    /// Sets the request ID this response is for.
    #[must_use]
    pub fn in_response_to(mut self, request_id: impl Into<String>) -> Self {
        self.in_response_to = Some(request_id.into());
        self
    }

    /// Sets the destination URL.
    #[must_use]
    pub fn with_destination(mut self, url: impl Into<String>) -> Self {
        self.destination = Some(url.into());
        self
    }

    /// Whether this response indicates success.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Serializes the response to XML.
    #[must_use]
    pub fn to_xml(&self) -> String {
        let samlp = xmlns::prefix_for(NS_SAML_PROTOCOL);
        let saml = xmlns::prefix_for(NS_SAML_ASSERTION);
        let in_response_to = self
            .in_response_to
            .as_ref()
            .map(|irt| format!(r#" InResponseTo="{irt}""#))
            .unwrap_or_default();
        let destination = self
            .destination
            .as_ref()
            .map(|d| format!(r#" Destination="{d}""#))
            .unwrap_or_default();

        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<{samlp}:LogoutResponse xmlns:{samlp}="{protocol_ns}" xmlns:{saml}="{assertion_ns}" ID="{id}" Version="2.0" IssueInstant="{instant}"{in_response_to}{destination}>
<{saml}:Issuer>{issuer}</{saml}:Issuer>
<{samlp}:Status>
<{samlp}:StatusCode Value="{status}"/>
</{samlp}:Status>
</{samlp}:LogoutResponse>"#,
            samlp = samlp,
            saml = saml,
            protocol_ns = NS_SAML_PROTOCOL,
            assertion_ns = NS_SAML_ASSERTION,
            id = self.id,
            instant = format_instant(self.issue_instant),
            issuer = self.issuer,
            status = self.status.code,
        )
    }

    /// Parses a logout response from XML.
    pub fn parse(xml: &str) -> SpResult<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut id = None;
        let mut in_response_to = None;
        let mut issuer = None;
        let mut status_code = None;
        let mut current_element = String::new();

        let mut buf = Vec::new();
        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                    let local = String::from_utf8_lossy(e.local_name().into_inner()).to_string();
                    current_element = local.clone();

                    match local.as_str() {
                        "LogoutResponse" => {
                            for attr in e.attributes().flatten() {
                                let key =
                                    String::from_utf8_lossy(attr.key.local_name().into_inner())
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
                            // Only the top-level code matters; sub-codes are
                            // nested and overwrite nothing.
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
                        _ => {}
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().unwrap_or_default().to_string();
                    if current_element == "Issuer" {
                        issuer = Some(text);
                    }
                }
                Ok(Event::End(_)) => current_element.clear(),
                Ok(Event::Eof) => break,
                Err(e) => return Err(SpError::XmlParse(e.to_string())),
                _ => {}
            }
            buf.clear();
        }

        Ok(Self {
            id: id.ok_or_else(|| SpError::XmlParse("missing LogoutResponse ID".to_string()))?,
            issue_instant: Utc::now(),
            issuer: issuer.unwrap_or_default(),
            in_response_to,
            destination: None,
            status: Status::new(status_code.ok_or_else(|| {
                SpError::XmlParse("missing StatusCode in LogoutResponse".to_string())
            })?),
        })
    }
}
