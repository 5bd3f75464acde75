//! Login initiation endpoint.
//!
//! Starts the SSO handshake: builds an authentication request for the
//! resolved identity provider and redirects the browser to it, after
//! recording the outstanding query that the assertion consumer will resolve.

use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};
use serde::Deserialize;

use fg_session::{OutstandingQueries, StateCache};

use crate::error::SpError;

use super::state::SpState;
use super::views;

/// Query parameters for the login endpoint.
#[derive(Debug, Deserialize)]
pub struct LoginParams {
    /// Desired post-login destination.
    pub next: Option<String>,

    /// Entity ID of the identity provider to use.
    pub idp: Option<String>,
}

/// GET handler for the login endpoint.
pub async fn login(
    State(state): State<SpState>,
    headers: HeaderMap,
    Query(params): Query<LoginParams>,
) -> Response {
    match handle_login(&state, &headers, params).await {
        Ok(response) => response,
        Err(e) => e.into_response(),
    }
}

async fn handle_login(
    state: &SpState,
    headers: &HeaderMap,
    params: LoginParams,
) -> Result<Response, SpError> {
    tracing::debug!("login process started");

    let came_from = state
        .config
        .relay_state_policy
        .resolve(params.next.as_deref(), &state.config.landing_url);

    let mut session = state.open_session(headers);

    if session.record.subject_id().is_some() {
        tracing::debug!("caller is already authenticated");
        return Ok(state.respond(
            &session,
            Html(views::already_authenticated_page(&came_from)),
        ));
    }

    // Discovery: with several IdPs configured and none selected, the user
    // picks one. Terminal response, nothing written.
    if params.idp.is_none() && state.config.idps.len() > 1 {
        tracing::debug!("rendering identity provider discovery page");
        return Ok(state.respond(
            &session,
            Html(views::discovery_page(&state.config.idps, &came_from)),
        ));
    }

    let mut blob = StateCache::view(&mut session.record).load();
    let prepared = state
        .engine
        .prepare_authentication(params.idp.as_deref(), &came_from, &mut blob)
        .await?;

    // The outstanding query must be durable before the browser leaves:
    // without it the follow-up request cannot resolve the destination.
    OutstandingQueries::view(&mut session.record).insert(&prepared.request_id, &came_from)?;
    StateCache::view(&mut session.record).sync(&blob);
    state.persist(&session);

    tracing::info!(
        request_id = %prepared.request_id,
        destination = %came_from,
        "redirecting to identity provider"
    );

    Ok(state.respond(&session, Redirect::to(&prepared.location)))
}
