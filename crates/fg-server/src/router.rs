//! Router assembly for the server binary.

use axum::routing::get;
use axum::Router;

use fg_protocol_saml::{saml_router, SpState};

/// Builds the full application router: liveness probe plus SP endpoints.
pub fn app(state: SpState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(saml_router())
        .with_state(state)
}

async fn health() -> &'static str {
    "ok"
}
