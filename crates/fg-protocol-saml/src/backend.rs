//! The authentication-backend seam.
//!
//! Once the engine has validated an assertion, someone has to decide which
//! local user it denotes. That mapping (and the policy question of creating
//! users on first login) belongs to the embedding application, behind this
//! trait.

use async_trait::async_trait;

use fg_core::config::AttributeMapping;

use crate::engine::SessionInfo;
use crate::error::SpResult;

/// A resolved local principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    /// Local username.
    pub username: String,
}

/// Maps validated assertions to local principals.
#[async_trait]
pub trait AuthenticationBackend: Send + Sync {
    /// Resolves a local principal for the asserted subject.
    ///
    /// Returns `Ok(None)` when no local principal results: the subject is
    /// unknown and creation is disabled, or the backend rejects the subject.
    /// That is an authentication failure, not an error.
    async fn authenticate(
        &self,
        session_info: &SessionInfo,
        attribute_mapping: &AttributeMapping,
        create_unknown_user: bool,
    ) -> SpResult<Option<Principal>>;
}
