//! Core SAML message types.
//!
//! The service provider *builds* requests (`AuthnRequest`, `LogoutRequest`,
//! `LogoutResponse`) and *parses* what the identity provider sends back
//! (`Response`, `LogoutRequest`, `LogoutResponse`).

pub mod authn_request;
pub mod constants;
pub mod logout;
pub mod response;
pub mod status;

pub use authn_request::AuthnRequest;
pub use constants::{saml_message_id, SamlBinding};
pub use logout::{LogoutRequest, LogoutResponse};
pub use response::{parse_response, ParsedAssertion, ParsedResponse};
pub use status::{Status, STATUS_PARTIAL_LOGOUT, STATUS_REQUESTER, STATUS_RESPONDER, STATUS_SUCCESS};
