//! SP metadata endpoint.

use axum::extract::State;
use axum::http::header;
use axum::response::{IntoResponse, Response};

use super::state::SpState;

/// GET handler serving this SP's entity descriptor.
pub async fn metadata(State(state): State<SpState>) -> Response {
    match state
        .engine
        .entity_descriptor(state.config.metadata_valid_for_hours)
    {
        Ok(xml) => (
            [(header::CONTENT_TYPE, "text/xml; charset=utf8")],
            xml,
        )
            .into_response(),
        Err(e) => e.into_response(),
    }
}
