//! Single Logout endpoints.
//!
//! Two handlers share this module:
//!
//! - [`logout`] starts SP-initiated logout for the authenticated subject and
//!   redirects to the identity provider.
//! - [`logout_service`] is the return half: a two-mode state machine
//!   selected by which of the two mutually exclusive parameters is present.
//!   `SAMLResponse` completes an SP-initiated logout; `SAMLRequest` is an
//!   IdP-initiated logout. Neither is a malformed request.

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use fg_core::event::{Event, EventType};
use fg_session::{IdentityCache, ProtocolStateBlob, StateCache};

use crate::engine::LogoutStatus;
use crate::error::SpError;

use super::state::{SessionHandle, SpState};
use super::views;

/// Query parameters for the logout-service endpoint (redirect binding).
#[derive(Debug, Deserialize)]
pub struct LogoutServiceParams {
    /// Present when completing an SP-initiated logout.
    #[serde(rename = "SAMLResponse")]
    pub saml_response: Option<String>,

    /// Present when the IdP initiates the logout.
    #[serde(rename = "SAMLRequest")]
    pub saml_request: Option<String>,

    /// Relay state to round-trip back to the IdP.
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// GET handler initiating SP-driven logout.
pub async fn logout(State(state): State<SpState>, headers: HeaderMap) -> Response {
    match handle_logout(&state, &headers).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// GET handler for the logout-service endpoint.
pub async fn logout_service(
    State(state): State<SpState>,
    headers: HeaderMap,
    Query(params): Query<LogoutServiceParams>,
) -> Response {
    match handle_logout_service(&state, &headers, params).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle_logout(state: &SpState, headers: &HeaderMap) -> Result<Response, SpError> {
    tracing::debug!("logout process started");

    let mut session = state.open_session(headers);

    // The endpoint is meant to sit behind an authentication guard; refusing
    // here keeps it safe without one.
    let Some(subject_id) = session.record.subject_id() else {
        tracing::warn!("logout requested without an authenticated session");
        return Ok((StatusCode::FORBIDDEN, Html(views::forbidden_page())).into_response());
    };

    let mut blob = StateCache::view(&mut session.record).load();
    let engine_response = state.engine.global_logout(&subject_id, &mut blob).await?;

    // The engine's state must be durable before the browser leaves; the
    // logout response arriving next depends on it.
    StateCache::view(&mut session.record).sync(&blob);
    state.persist(&session);

    let location = engine_response.location().ok_or_else(|| {
        SpError::EngineContract("global logout response carries no Location header".to_string())
    })?;

    tracing::info!(subject = %subject_id, "redirecting to identity provider for logout");
    Ok(state.respond(&session, Redirect::to(location)))
}

async fn handle_logout_service(
    state: &SpState,
    headers: &HeaderMap,
    params: LogoutServiceParams,
) -> Result<Response, SpError> {
    tracing::debug!("logout service started");

    let session = state.open_session(headers);

    if let Some(saml_response) = params.saml_response {
        // Mode A: completion of a logout this SP started.
        handle_sp_initiated_completion(state, session, &saml_response).await
    } else if let Some(saml_request) = params.saml_request {
        // Mode B: logout started by the IdP, possibly on behalf of another SP.
        handle_idp_initiated(state, session, &saml_request, params.relay_state.as_deref()).await
    } else {
        tracing::warn!("logout service hit with neither SAMLResponse nor SAMLRequest");
        Err(SpError::NotFound)
    }
}

async fn handle_sp_initiated_completion(
    state: &SpState,
    mut session: SessionHandle,
    saml_response: &str,
) -> Result<Response, SpError> {
    tracing::debug!("receiving a logout response from the identity provider");

    let mut blob = StateCache::view(&mut session.record).load();
    let outcome = state
        .engine
        .process_logout_response(saml_response, &mut blob)
        .await;

    // Protocol state is persisted regardless of the outcome.
    sync_state(state, &mut session, &blob);

    match outcome {
        Ok(LogoutStatus::Success) => {
            let subject_id = session.record.subject_id();
            clear_local_session(state, &mut session);
            state.events.emit(
                &Event::builder(EventType::Logout)
                    .success()
                    .subject(subject_id.unwrap_or_default())
                    .session(session.id.as_str())
                    .build(),
            );
            Ok(state.respond(&session, Redirect::to(&state.config.post_logout_url)))
        }
        Ok(LogoutStatus::Failed) => {
            tracing::error!("identity provider reported logout failure");
            Ok(state.respond(&session, Html(views::logout_failure_page())))
        }
        Err(e) => {
            tracing::error!(error = %e, "logout response could not be validated");
            Ok(state.respond(&session, Html(views::logout_failure_page())))
        }
    }
}

async fn handle_idp_initiated(
    state: &SpState,
    mut session: SessionHandle,
    saml_request: &str,
    relay_state: Option<&str>,
) -> Result<Response, SpError> {
    tracing::debug!("receiving a logout request from the identity provider");

    let subject_id = session.record.subject_id();
    let mut blob = StateCache::view(&mut session.record).load();
    let outcome = state
        .engine
        .process_logout_request(saml_request, relay_state, subject_id.as_deref(), &mut blob)
        .await;

    sync_state(state, &mut session, &blob);

    let outcome = match outcome {
        Ok(outcome) => outcome,
        Err(e) => {
            tracing::error!(error = %e, "logout request could not be processed");
            return Ok(state.respond(&session, Html(views::logout_failure_page())));
        }
    };

    if outcome.success {
        let response = outcome.response.ok_or_else(|| {
            SpError::EngineContract("successful logout request yielded no response".to_string())
        })?;
        let location = response.location().ok_or_else(|| {
            SpError::EngineContract("logout request response carries no Location header".to_string())
        })?;

        clear_local_session(state, &mut session);
        state.events.emit(
            &Event::builder(EventType::Logout)
                .success()
                .subject(subject_id.unwrap_or_default())
                .session(session.id.as_str())
                .build(),
        );

        tracing::info!("session terminated by identity provider request");
        let location = location.to_string();
        Ok(state.respond(&session, Redirect::to(&location)))
    } else if let Some(response) = outcome.response {
        // Soft failure: answer the IdP, but the local session stays.
        let location = response.location().ok_or_else(|| {
            SpError::EngineContract("logout request response carries no Location header".to_string())
        })?;

        tracing::warn!("logout request not honored, returning failure response to identity provider");
        state.events.emit(
            &Event::builder(EventType::LogoutError)
                .failure("logout request not honored for this session")
                .session(session.id.as_str())
                .build(),
        );
        let location = location.to_string();
        Ok(state.respond(&session, Redirect::to(&location)))
    } else {
        tracing::error!("logout request produced no response to send back");
        Ok(state.respond(&session, Html(views::logout_failure_page())))
    }
}

/// Writes the engine's state blob back and persists the session.
fn sync_state(state: &SpState, session: &mut SessionHandle, blob: &ProtocolStateBlob) {
    StateCache::view(&mut session.record).sync(blob);
    state.persist(session);
}

/// Clears the authenticated subject and its cached identity.
fn clear_local_session(state: &SpState, session: &mut SessionHandle) {
    if let Some(subject_id) = session.record.subject_id() {
        IdentityCache::view(&mut session.record).remove(&subject_id);
    }
    session.record.clear_subject_id();
    state.persist(session);
}
