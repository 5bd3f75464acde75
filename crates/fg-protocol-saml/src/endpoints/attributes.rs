//! Attribute echo endpoint.
//!
//! Shows the cached attribute set for the signed-in subject. The lookup
//! bypasses the freshness deadline so the page stays usable for diagnosing
//! an expired identity record.

use std::collections::HashMap;

use axum::extract::State;
use axum::http::HeaderMap;
use axum::response::{Html, IntoResponse, Redirect, Response};

use fg_session::IdentityCache;

use super::state::SpState;
use super::views;

/// GET handler rendering the subject's cached attributes.
pub async fn attributes(State(state): State<SpState>, headers: HeaderMap) -> Response {
    let mut session = state.open_session(&headers);

    let Some(subject_id) = session.record.subject_id() else {
        return Redirect::to("/saml2/login").into_response();
    };

    let record = IdentityCache::view(&mut session.record).get(&subject_id, false);
    let attributes = record.map(|r| r.attributes).unwrap_or_else(HashMap::new);

    state.respond(&session, Html(views::attributes_page(&subject_id, &attributes)))
}
