//! SAML 2.0 Service Provider orchestration for Fedgate.
//!
//! This crate drives the service-provider side of the Web Browser SSO and
//! Single Logout profiles across several independent HTTP requests:
//!
//! - **Login initiation** - build an `AuthnRequest` and redirect to the IdP
//! - **Assertion consumption** - validate the IdP's response and establish
//!   the local authenticated session
//! - **Logout initiation and response handling** - SP- and IdP-initiated
//!   Single Logout
//! - **Metadata publishing** - this SP's entity descriptor
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`engine`] - the protocol-engine seam the controllers delegate to for
//!   message construction and validation
//! - [`backend`] - the authentication-backend seam mapping asserted
//!   attributes to a local principal
//! - [`types`] - SAML message types built and parsed by the default engine
//! - [`bindings`] - HTTP-POST and HTTP-Redirect binding codecs
//! - [`client`] - the built-in [`client::DefaultEngine`]
//! - [`endpoints`] - Axum HTTP handlers and router
//! - [`error`] - error taxonomy for SP operations
//!
//! Cryptographic verification (XML signatures, encryption) is outside this
//! crate; deployments that require it plug a full-featured engine in behind
//! the [`engine::SamlEngine`] trait.
//!
//! # SAML Specifications
//!
//! - [SAML 2.0 Core](https://docs.oasis-open.org/security/saml/v2.0/saml-core-2.0-os.pdf)
//! - [SAML 2.0 Bindings](https://docs.oasis-open.org/security/saml/v2.0/saml-bindings-2.0-os.pdf)
//! - [SAML 2.0 Profiles](https://docs.oasis-open.org/security/saml/v2.0/saml-profiles-2.0-os.pdf)

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backend;
pub mod bindings;
pub mod client;
pub mod endpoints;
pub mod engine;
pub mod error;
pub mod metadata;
pub mod types;
pub mod xmlns;

pub use backend::{AuthenticationBackend, Principal};
pub use client::DefaultEngine;
pub use endpoints::{saml_router, SpState};
pub use engine::{SamlEngine, SessionInfo};
pub use error::{SpError, SpResult};
pub use xmlns::register_namespace_prefixes;
