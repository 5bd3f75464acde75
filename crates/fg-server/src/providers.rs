//! Provider implementations for the server binary.
//!
//! The authentication backend here keeps users in memory: enough for
//! development, demos and tests. Deployments with a real user store
//! implement [`AuthenticationBackend`] against it instead.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use fg_core::config::AttributeMapping;
use fg_protocol_saml::backend::{AuthenticationBackend, Principal};
use fg_protocol_saml::engine::SessionInfo;
use fg_protocol_saml::error::{SpError, SpResult};

/// In-memory user store acting as the authentication backend.
#[derive(Default)]
pub struct InMemoryUserBackend {
    users: RwLock<HashMap<String, Principal>>,
}

impl InMemoryUserBackend {
    /// Creates an empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-registers a local user.
    pub fn add_user(&self, username: &str) {
        let mut users = self.users.write().expect("user store lock poisoned");
        users.insert(
            username.to_string(),
            Principal {
                username: username.to_string(),
            },
        );
    }

    /// Number of known users.
    #[must_use]
    pub fn user_count(&self) -> usize {
        self.users.read().expect("user store lock poisoned").len()
    }

    /// Derives the local username from the asserted attributes.
    ///
    /// The first mapping entry whose attribute is present wins; the name
    /// identifier is the fallback.
    fn local_username(session_info: &SessionInfo, mapping: &AttributeMapping) -> String {
        for (attribute, fields) in &mapping.map {
            if fields.iter().any(|f| f == "username") {
                if let Some(values) = session_info.attributes.get(attribute) {
                    if let Some(first) = values.first() {
                        return first.clone();
                    }
                }
            }
        }
        session_info.name_id.clone()
    }
}

#[async_trait]
impl AuthenticationBackend for InMemoryUserBackend {
    async fn authenticate(
        &self,
        session_info: &SessionInfo,
        attribute_mapping: &AttributeMapping,
        create_unknown_user: bool,
    ) -> SpResult<Option<Principal>> {
        let username = Self::local_username(session_info, attribute_mapping);

        let mut users = self
            .users
            .write()
            .map_err(|_| SpError::Internal("user store lock poisoned".to_string()))?;

        if let Some(principal) = users.get(&username) {
            return Ok(Some(principal.clone()));
        }

        if !create_unknown_user {
            tracing::warn!(username = %username, "unknown subject and user creation is disabled");
            return Ok(None);
        }

        tracing::info!(username = %username, "creating local user on first login");
        let principal = Principal { username };
        users.insert(principal.username.clone(), principal.clone());
        Ok(Some(principal))
    }
}
