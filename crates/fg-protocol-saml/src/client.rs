//! The built-in protocol engine.
//!
//! [`DefaultEngine`] implements [`SamlEngine`] over the message types and
//! binding codecs in this crate. It performs structural and semantic
//! validation (status, solicitation matching, audience, validity window) but
//! no cryptographic verification; deployments that require XML signature
//! checking plug in a different engine.
//!
//! Between requests the engine remembers, per subject, which identity
//! providers it authenticated through and which logout exchange is in
//! flight. That memory lives in the opaque state blob the orchestration
//! layer persists for it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use fg_core::config::{IdpEntry, SpConfig};
use fg_session::ProtocolStateBlob;

use crate::bindings::{HttpPostBinding, HttpRedirectBinding};
use crate::engine::{
    EngineHttpResponse, LogoutRequestOutcome, LogoutStatus, PreparedAuthn, SamlEngine, SessionInfo,
    ValidatedResponse,
};
use crate::error::{SpError, SpResult};
use crate::metadata;
use crate::types::{parse_response, AuthnRequest, LogoutRequest, LogoutResponse, Status};

/// An IdP session recorded after a successful assertion.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct IdpSession {
    subject: String,
    idp_entity_id: String,
    session_index: Option<String>,
}

/// An SP-initiated logout exchange awaiting its response.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PendingLogout {
    request_id: String,
    subject: String,
    idp_entity_id: String,
}

/// The engine's view of the opaque state blob.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct EngineState {
    #[serde(default)]
    idp_sessions: Vec<IdpSession>,
    #[serde(default)]
    pending_logout: Option<PendingLogout>,
}

impl EngineState {
    fn load(blob: &ProtocolStateBlob) -> Self {
        if blob.is_empty() {
            return Self::default();
        }
        serde_json::from_value(blob.0.clone()).unwrap_or_default()
    }

    fn store(&self, blob: &mut ProtocolStateBlob) {
        blob.0 = serde_json::to_value(self).unwrap_or(serde_json::Value::Null);
    }
}

/// Built-in SAML protocol engine.
pub struct DefaultEngine {
    config: SpConfig,
}

impl DefaultEngine {
    /// Creates an engine over the given SP configuration.
    #[must_use]
    pub fn new(config: SpConfig) -> Self {
        Self { config }
    }

    /// Resolves the target identity provider.
    fn resolve_idp(&self, entity_id: Option<&str>) -> SpResult<&IdpEntry> {
        match entity_id {
            Some(id) => self.config.idp(id).ok_or_else(|| {
                SpError::Configuration(format!("unknown identity provider: {id}"))
            }),
            None => match self.config.idps.as_slice() {
                [only] => Ok(only),
                [] => Err(SpError::Configuration(
                    "no identity providers configured".to_string(),
                )),
                _ => Err(SpError::Configuration(
                    "unable to determine which identity provider to use".to_string(),
                )),
            },
        }
    }
}

#[async_trait]
impl SamlEngine for DefaultEngine {
    async fn prepare_authentication(
        &self,
        idp_entity_id: Option<&str>,
        relay_state: &str,
        _state: &mut ProtocolStateBlob,
    ) -> SpResult<PreparedAuthn> {
        let idp = self.resolve_idp(idp_entity_id)?;

        let request = AuthnRequest::new(
            &self.config.entity_id,
            &self.config.acs_url,
            &idp.sso_url,
        );
        let location =
            HttpRedirectBinding::encode_request(&request.to_xml(), &idp.sso_url, Some(relay_state))?;

        tracing::debug!(
            request_id = %request.id,
            idp = %idp.entity_id,
            "prepared authentication request"
        );

        Ok(PreparedAuthn {
            request_id: request.id,
            location,
        })
    }

    async fn process_response(
        &self,
        saml_response: &str,
        outstanding: &HashMap<String, String>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<ValidatedResponse> {
        let xml = HttpPostBinding::decode(saml_response)?;
        let parsed = parse_response(&xml)?;

        if !Status::new(&parsed.status_code).is_success() {
            return Err(SpError::Validation(format!(
                "response status is not success: {}",
                parsed.status_code
            )));
        }

        let assertion = parsed.assertion.ok_or_else(|| {
            SpError::Validation("success response carries no assertion".to_string())
        })?;

        // Solicitation matching. A response correlated to an identifier this
        // SP never issued is rejected outright; an uncorrelated response is
        // left to the caller's unsolicited-response policy.
        if let Some(irt) = &parsed.in_response_to {
            if !outstanding.contains_key(irt) {
                return Err(SpError::Validation(format!(
                    "response correlates to no outstanding request: {irt}"
                )));
            }
        }

        if let Some(deadline) = assertion.not_on_or_after {
            if Utc::now() >= deadline {
                return Err(SpError::Validation("assertion is expired".to_string()));
            }
        }

        if let Some(audience) = &assertion.audience {
            if audience != &self.config.entity_id {
                return Err(SpError::Validation(format!(
                    "assertion audience mismatch: {audience}"
                )));
            }
        }

        let issuer = parsed
            .issuer
            .ok_or_else(|| SpError::Validation("response carries no issuer".to_string()))?;
        if self.config.idp(&issuer).is_none() {
            return Err(SpError::Validation(format!(
                "response from unknown identity provider: {issuer}"
            )));
        }

        let mut engine_state = EngineState::load(state);
        engine_state.idp_sessions.retain(|s| {
            !(s.subject == assertion.name_id && s.idp_entity_id == issuer)
        });
        engine_state.idp_sessions.push(IdpSession {
            subject: assertion.name_id.clone(),
            idp_entity_id: issuer.clone(),
            session_index: assertion.session_index.clone(),
        });
        engine_state.store(state);

        Ok(ValidatedResponse {
            in_response_to: parsed.in_response_to,
            session_info: SessionInfo {
                name_id: assertion.name_id,
                issuer,
                attributes: assertion.attributes,
                session_index: assertion.session_index,
                not_on_or_after: assertion.not_on_or_after,
            },
        })
    }

    async fn global_logout(
        &self,
        subject_id: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<EngineHttpResponse> {
        let mut engine_state = EngineState::load(state);

        let session = engine_state
            .idp_sessions
            .iter()
            .find(|s| s.subject == subject_id)
            .cloned()
            .ok_or_else(|| {
                SpError::Session(format!(
                    "no identity provider session recorded for subject {subject_id}"
                ))
            })?;

        let idp = self.config.idp(&session.idp_entity_id).ok_or_else(|| {
            SpError::Configuration(format!(
                "identity provider no longer configured: {}",
                session.idp_entity_id
            ))
        })?;

        let mut request = LogoutRequest::new(&self.config.entity_id, subject_id)
            .with_destination(&idp.slo_url);
        if let Some(index) = &session.session_index {
            request = request.with_session_index(index);
        }

        let location = HttpRedirectBinding::encode_request(&request.to_xml(), &idp.slo_url, None)?;

        engine_state.pending_logout = Some(PendingLogout {
            request_id: request.id.clone(),
            subject: subject_id.to_string(),
            idp_entity_id: idp.entity_id.clone(),
        });
        engine_state.store(state);

        tracing::debug!(
            request_id = %request.id,
            idp = %idp.entity_id,
            "initiated global logout"
        );

        Ok(EngineHttpResponse::redirect(location))
    }

    async fn process_logout_response(
        &self,
        saml_response: &str,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutStatus> {
        let xml = HttpRedirectBinding::decode(saml_response)?;
        let response = LogoutResponse::parse(&xml)?;

        let mut engine_state = EngineState::load(state);
        let Some(pending) = engine_state.pending_logout.take() else {
            engine_state.store(state);
            tracing::warn!("logout response received with no logout in flight");
            return Ok(LogoutStatus::Failed);
        };

        // The exchange is over either way; only a matching success clears
        // the recorded IdP sessions.
        let matches = response.in_response_to.as_deref() == Some(pending.request_id.as_str());
        let status = if matches && response.is_success() {
            engine_state
                .idp_sessions
                .retain(|s| s.subject != pending.subject);
            LogoutStatus::Success
        } else {
            tracing::warn!(
                in_response_to = response.in_response_to.as_deref().unwrap_or("-"),
                status = %response.status.code,
                "logout response did not complete the exchange"
            );
            LogoutStatus::Failed
        };

        engine_state.store(state);
        Ok(status)
    }

    async fn process_logout_request(
        &self,
        saml_request: &str,
        relay_state: Option<&str>,
        subject_id: Option<&str>,
        state: &mut ProtocolStateBlob,
    ) -> SpResult<LogoutRequestOutcome> {
        let xml = HttpRedirectBinding::decode(saml_request)?;
        let request = LogoutRequest::parse(&xml)?;

        let Some(idp) = self.config.idp(&request.issuer) else {
            return Err(SpError::Validation(format!(
                "logout request from unknown identity provider: {}",
                request.issuer
            )));
        };

        let subject_matches = subject_id == Some(request.name_id.as_str());
        let status = if subject_matches {
            Status::success()
        } else {
            tracing::warn!(
                requested = %request.name_id,
                "logout request names a different subject than the session"
            );
            Status::requester()
        };

        let response = LogoutResponse::with_status(&self.config.entity_id, status)
            .in_response_to(&request.id)
            .with_destination(&idp.slo_url);
        let location =
            HttpRedirectBinding::encode_response(&response.to_xml(), &idp.slo_url, relay_state)?;

        if subject_matches {
            let mut engine_state = EngineState::load(state);
            engine_state
                .idp_sessions
                .retain(|s| s.subject != request.name_id);
            engine_state.store(state);
        }

        Ok(LogoutRequestOutcome {
            response: Some(EngineHttpResponse::redirect(location)),
            success: subject_matches,
        })
    }

    fn entity_descriptor(&self, valid_for_hours: u32) -> SpResult<String> {
        metadata::entity_descriptor(&self.config, valid_for_hours)
    }
}
