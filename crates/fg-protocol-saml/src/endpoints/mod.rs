//! Axum HTTP handlers for the SP endpoints.
//!
//! Each handler is a thin wrapper around a `handle_*` function returning
//! `Result`; failures are logged and converted into the user-visible
//! response in one place.

pub mod acs;
pub mod attributes;
pub mod login;
pub mod logout;
pub mod metadata;
pub mod router;
pub mod state;
pub mod views;

pub use router::saml_router;
pub use state::{SessionHandle, SpState};

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::error::SpError;

impl IntoResponse for SpError {
    fn into_response(self) -> Response {
        if self.is_server_error() {
            tracing::error!(error = %self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let status =
            StatusCode::from_u16(self.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);

        match self {
            Self::Configuration(detail) => {
                (status, Html(views::configuration_error_page(&detail))).into_response()
            }
            Self::Authentication(_) => {
                (status, Html(views::authentication_error_page())).into_response()
            }
            Self::NotFound => (status, "Not Found").into_response(),
            Self::Validation(ref detail) => (status, format!("Bad request: {detail}")).into_response(),
            _ => (status, "Internal error during the SAML exchange").into_response(),
        }
    }
}
