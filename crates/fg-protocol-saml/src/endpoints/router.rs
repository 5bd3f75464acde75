//! SP route definitions.

use axum::routing::get;
use axum::Router;

use super::acs::{acs, acs_method_not_allowed};
use super::attributes::attributes;
use super::login::login;
use super::logout::{logout, logout_service};
use super::metadata::metadata;
use super::state::SpState;

/// Creates the SP protocol router.
///
/// # Endpoints
///
/// | Method | Path                | Handler          | Description                      |
/// |--------|---------------------|------------------|----------------------------------|
/// | GET    | `/saml2/login`      | `login`          | Login initiation / discovery     |
/// | POST   | `/saml2/acs`        | `acs`            | Assertion consumer service       |
/// | GET    | `/saml2/logout`     | `logout`         | SP-initiated logout              |
/// | GET    | `/saml2/ls`         | `logout_service` | Logout response/request service  |
/// | GET    | `/saml2/metadata`   | `metadata`       | SP entity descriptor             |
/// | GET    | `/saml2/attributes` | `attributes`     | Attribute echo for the subject   |
///
/// # Request-forgery protection
///
/// `/saml2/acs` is called by the identity provider through a cross-origin
/// browser POST. Same-site forgery protections are not designed to authorize
/// that caller, so any CSRF middleware the embedding application installs
/// MUST exempt this route. The exemption is a protocol property, not an
/// oversight.
pub fn saml_router() -> Router<SpState> {
    Router::new()
        .route("/saml2/login", get(login))
        .route("/saml2/acs", axum::routing::post(acs).get(acs_method_not_allowed))
        .route("/saml2/logout", get(logout))
        .route("/saml2/ls", get(logout_service))
        .route("/saml2/metadata", get(metadata))
        .route("/saml2/attributes", get(attributes))
}
