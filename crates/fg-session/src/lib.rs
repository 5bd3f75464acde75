//! # fg-session
//!
//! Browser-session storage for the Fedgate SAML service provider.
//!
//! A session is a key/value record scoped to one browser, carried by an
//! opaque cookie token. The SAML layer keeps four entries in it, each behind
//! a distinct namespaced key so unrelated session data is never touched:
//!
//! - the current subject identifier (absent while anonymous)
//! - the outstanding-query map ([`OutstandingQueries`])
//! - the identity cache ([`IdentityCache`])
//! - the opaque protocol-state blob ([`StateCache`])
//!
//! The caches are thin typed views over the raw session record; the endpoint
//! controllers depend only on those views, never on the store itself.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod error;
pub mod identity;
pub mod outstanding;
pub mod state;
pub mod store;

pub use error::{SessionError, SessionResult};
pub use identity::{IdentityCache, IdentityRecord};
pub use outstanding::OutstandingQueries;
pub use state::{ProtocolStateBlob, StateCache};
pub use store::{Session, SessionId, SessionStore};
