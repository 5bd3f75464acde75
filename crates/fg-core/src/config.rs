//! Service provider configuration.
//!
//! Holds everything the endpoint controllers and the protocol engine need to
//! know about this SP and the identity providers it federates with. Settings
//! that deployments sometimes want to compute per request (attribute mapping,
//! unknown-user creation) are wrapped in [`Setting`] so a static value and a
//! computed one go through the same call site.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// An identity provider this SP is configured to federate with.
#[derive(Debug, Clone)]
pub struct IdpEntry {
    /// Entity ID of the identity provider.
    pub entity_id: String,

    /// Human-readable name shown on the discovery page.
    pub display_name: String,

    /// Single Sign-On service URL (HTTP-Redirect binding).
    pub sso_url: String,

    /// Single Logout service URL (HTTP-Redirect binding).
    pub slo_url: String,
}

/// Policy applied to caller-supplied redirect destinations.
///
/// The post-login redirect target is caller data that round-trips through the
/// identity provider. Accepting it verbatim is an open-redirect exposure, so
/// the policy is an explicit configuration choice rather than an implicit
/// behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelayStatePolicy {
    /// Only rooted local paths (`/...` but not `//...`) are accepted; anything
    /// else falls back to the configured landing URL.
    #[default]
    RelativeOnly,

    /// The destination is used verbatim.
    AcceptAny,
}

impl RelayStatePolicy {
    /// Resolves a caller-supplied destination against this policy.
    ///
    /// Returns the candidate when the policy admits it, the fallback
    /// otherwise. A missing candidate always resolves to the fallback.
    #[must_use]
    pub fn resolve(self, candidate: Option<&str>, fallback: &str) -> String {
        let Some(candidate) = candidate.filter(|c| !c.is_empty()) else {
            return fallback.to_string();
        };

        match self {
            Self::AcceptAny => candidate.to_string(),
            Self::RelativeOnly => {
                if candidate.starts_with('/')
                    && !candidate.starts_with("//")
                    && !candidate.contains('\\')
                {
                    candidate.to_string()
                } else {
                    tracing::warn!(
                        destination = %candidate,
                        "rejected non-local redirect destination, using fallback"
                    );
                    fallback.to_string()
                }
            }
        }
    }
}

/// Mapping from asserted attribute names to local user fields.
///
/// Keys are attribute names as asserted by the identity provider; values are
/// the local fields they populate. The first entry whose attribute is present
/// in an assertion determines the local username.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeMapping {
    /// Asserted attribute name to local field names.
    pub map: HashMap<String, Vec<String>>,
}

impl AttributeMapping {
    /// Creates a mapping from an iterator of `(attribute, fields)` pairs.
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = (S, Vec<S>)>,
        S: Into<String>,
    {
        Self {
            map: entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }
}

impl Default for AttributeMapping {
    fn default() -> Self {
        Self::new([("uid", vec!["username"])])
    }
}

/// A configuration setting that is either a static value or computed fresh
/// each time it is resolved.
pub enum Setting<T> {
    /// A fixed value.
    Static(T),
    /// A value computed at resolution time.
    Computed(Arc<dyn Fn() -> T + Send + Sync>),
}

impl<T: Clone> Setting<T> {
    /// Resolves the setting to a concrete value.
    ///
    /// Callers resolve once at the start of each request that needs the
    /// value, so a computed setting is evaluated exactly once per request.
    #[must_use]
    pub fn resolve(&self) -> T {
        match self {
            Self::Static(value) => value.clone(),
            Self::Computed(f) => f(),
        }
    }
}

impl<T: Clone> Clone for Setting<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Static(value) => Self::Static(value.clone()),
            Self::Computed(f) => Self::Computed(Arc::clone(f)),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Setting<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(value) => f.debug_tuple("Static").field(value).finish(),
            Self::Computed(_) => f.debug_tuple("Computed").field(&"<fn>").finish(),
        }
    }
}

/// Service provider configuration.
#[derive(Debug, Clone)]
pub struct SpConfig {
    /// Entity ID of this service provider.
    pub entity_id: String,

    /// Assertion Consumer Service URL of this SP.
    pub acs_url: String,

    /// Single Logout Service URL of this SP.
    pub sls_url: String,

    /// Identity providers this SP federates with.
    pub idps: Vec<IdpEntry>,

    /// Default post-login destination when the caller supplies none.
    pub landing_url: String,

    /// Destination after a completed SP-initiated logout.
    pub post_logout_url: String,

    /// Validity window advertised in the SP metadata, in hours.
    pub metadata_valid_for_hours: u32,

    /// Policy for caller-supplied redirect destinations.
    pub relay_state_policy: RelayStatePolicy,

    /// Whether responses without a known correlation identifier are accepted.
    ///
    /// Disabled by default: a response whose `InResponseTo` was never issued
    /// by this SP is rejected. Enabling this restores support for
    /// IdP-initiated SSO.
    pub allow_unsolicited: bool,

    /// Mapping from asserted attributes to local user fields.
    pub attribute_mapping: Setting<AttributeMapping>,

    /// Whether subjects unknown to the local user store are created on first
    /// login.
    pub create_unknown_user: Setting<bool>,
}

impl SpConfig {
    /// Looks up a configured identity provider by entity ID.
    #[must_use]
    pub fn idp(&self, entity_id: &str) -> Option<&IdpEntry> {
        self.idps.iter().find(|idp| idp.entity_id == entity_id)
    }

    /// Creates a configuration for testing with the given identity providers.
    #[must_use]
    pub fn for_testing(idps: Vec<IdpEntry>) -> Self {
        Self {
            entity_id: "https://sp.example.com/saml2/metadata".to_string(),
            acs_url: "https://sp.example.com/saml2/acs".to_string(),
            sls_url: "https://sp.example.com/saml2/ls".to_string(),
            idps,
            landing_url: "/".to_string(),
            post_logout_url: "/".to_string(),
            metadata_valid_for_hours: 24,
            relay_state_policy: RelayStatePolicy::RelativeOnly,
            allow_unsolicited: false,
            attribute_mapping: Setting::Static(AttributeMapping::default()),
            create_unknown_user: Setting::Static(true),
        }
    }
}

impl Default for SpConfig {
    fn default() -> Self {
        Self::for_testing(Vec::new())
    }
}
