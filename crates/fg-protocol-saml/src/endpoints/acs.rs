//! Assertion consumer endpoint.
//!
//! The identity provider delivers its authentication response here via a
//! cross-origin browser POST. This is the one place a trust decision is
//! made: on a validated response with a resolvable local principal, the
//! session becomes authenticated.

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{IntoResponse, Redirect, Response};
use axum::Form;
use serde::Deserialize;

use fg_core::event::{Event, EventType};
use fg_session::{IdentityCache, IdentityRecord, OutstandingQueries, StateCache};

use crate::error::SpError;

use super::state::SpState;

/// Form fields of the assertion consumer POST.
#[derive(Debug, Deserialize)]
pub struct AcsForm {
    /// The encoded authentication response.
    #[serde(rename = "SAMLResponse")]
    pub saml_response: Option<String>,

    /// Round-tripped post-login destination.
    #[serde(rename = "RelayState")]
    pub relay_state: Option<String>,
}

/// POST handler for the assertion consumer endpoint.
pub async fn acs(
    State(state): State<SpState>,
    headers: HeaderMap,
    Form(form): Form<AcsForm>,
) -> Response {
    match handle_acs(&state, &headers, form).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

/// Handler bound to every non-POST method on the ACS route.
///
/// The endpoint is POST-only by protocol; anything else is a validation
/// failure, not a method-routing concern.
pub async fn acs_method_not_allowed() -> Response {
    SpError::Validation("assertion consumer service only accepts POST".to_string()).into_response()
}

async fn handle_acs(
    state: &SpState,
    headers: &HeaderMap,
    form: AcsForm,
) -> Result<Response, SpError> {
    tracing::debug!("assertion consumer service started");

    let Some(payload) = form.saml_response else {
        return Err(SpError::Validation(
            "could not find \"SAMLResponse\" in POST data".to_string(),
        ));
    };

    let mut session = state.open_session(headers);
    let outstanding = OutstandingQueries::view(&mut session.record).all();
    let mut blob = StateCache::view(&mut session.record).load();

    // The engine is the sole authority on solicitation matching and
    // validity. A rejection writes nothing back.
    let validated = state
        .engine
        .process_response(&payload, &outstanding, &mut blob)
        .await?;

    match &validated.in_response_to {
        Some(request_id) => {
            OutstandingQueries::view(&mut session.record).remove(request_id);
        }
        None if !state.config.allow_unsolicited => {
            return Err(SpError::Validation(
                "response carries no correlation identifier and unsolicited responses are not accepted".to_string(),
            ));
        }
        None => {
            tracing::info!("accepting unsolicited response");
        }
    }

    // Both settings may be static or computed per request; resolve once.
    let attribute_mapping = state.config.attribute_mapping.resolve();
    let create_unknown_user = state.config.create_unknown_user.resolve();

    tracing::debug!(subject = %validated.session_info.name_id, "resolving local principal");
    let principal = state
        .backend
        .authenticate(&validated.session_info, &attribute_mapping, create_unknown_user)
        .await?;

    let Some(principal) = principal else {
        // The exchange is complete; the outstanding entry stays consumed and
        // the engine's state is kept, but no authenticated session results.
        StateCache::view(&mut session.record).sync(&blob);
        state.persist(&session);
        state.events.emit(
            &Event::builder(EventType::LoginError)
                .failure("no local principal for asserted subject")
                .subject(&validated.session_info.name_id)
                .session(session.id.as_str())
                .build(),
        );
        return Err(SpError::Authentication(format!(
            "no local principal for subject {}",
            validated.session_info.name_id
        )));
    };

    let info = &validated.session_info;
    session.record.set_subject_id(&info.name_id);
    IdentityCache::view(&mut session.record).put(IdentityRecord {
        subject_id: info.name_id.clone(),
        attributes: info.attributes.clone(),
        not_on_or_after: info.not_on_or_after,
    });
    StateCache::view(&mut session.record).sync(&blob);
    state.persist(&session);

    // Best-effort notification; sink failures never abort the login.
    let mut event = Event::builder(EventType::Login)
        .success()
        .subject(&info.name_id)
        .session(session.id.as_str())
        .detail("principal", &principal.username)
        .detail("idp", &info.issuer);
    for (name, values) in &info.attributes {
        event = event.detail(format!("attr.{name}"), values.join(","));
    }
    state.events.emit(&event.build());

    // Site root when the POST carries no relay value.
    let destination = state
        .config
        .relay_state_policy
        .resolve(form.relay_state.as_deref(), "/");

    tracing::info!(
        principal = %principal.username,
        destination = %destination,
        "authentication established, redirecting"
    );

    Ok(state.respond(&session, Redirect::to(&destination)))
}
