//! Server configuration.
//!
//! Configuration is loaded from environment variables with sensible
//! defaults. Identity providers are declared in `FG_IDPS` as a
//! comma-separated list of `entity_id|display_name|sso_url|slo_url` tuples.

use fg_core::config::{AttributeMapping, IdpEntry, RelayStatePolicy, Setting, SpConfig};

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Server host to bind to.
    pub host: String,

    /// Server port.
    pub port: u16,

    /// Base URL for the server (used in generated SP URLs).
    pub base_url: String,

    /// Service provider configuration.
    pub sp: SpConfig,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if it exists
        let _ = dotenvy::dotenv();

        let host = std::env::var("FG_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port = std::env::var("FG_PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let base_url =
            std::env::var("FG_BASE_URL").unwrap_or_else(|_| format!("http://{host}:{port}"));

        let idps_raw = std::env::var("FG_IDPS").map_err(|_| {
            anyhow::anyhow!("FG_IDPS environment variable is required (entity_id|display_name|sso_url|slo_url, comma-separated)")
        })?;
        let idps = parse_idps(&idps_raw)?;

        let entity_id = std::env::var("FG_ENTITY_ID")
            .unwrap_or_else(|_| format!("{base_url}/saml2/metadata"));

        let landing_url = std::env::var("FG_LANDING_URL").unwrap_or_else(|_| "/".to_string());
        let post_logout_url =
            std::env::var("FG_POST_LOGOUT_URL").unwrap_or_else(|_| "/".to_string());

        let metadata_valid_for_hours = std::env::var("FG_METADATA_VALID_FOR_HOURS")
            .ok()
            .and_then(|v| v.parse().ok())
            .unwrap_or(24);

        let relay_state_policy = match std::env::var("FG_RELAY_STATE_POLICY").as_deref() {
            Ok("accept-any") => RelayStatePolicy::AcceptAny,
            _ => RelayStatePolicy::RelativeOnly,
        };

        let allow_unsolicited = std::env::var("FG_ALLOW_UNSOLICITED")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let create_unknown_user = std::env::var("FG_CREATE_UNKNOWN_USER")
            .map(|v| v != "0" && !v.eq_ignore_ascii_case("false"))
            .unwrap_or(true);

        let sp = SpConfig {
            entity_id,
            acs_url: format!("{base_url}/saml2/acs"),
            sls_url: format!("{base_url}/saml2/ls"),
            idps,
            landing_url,
            post_logout_url,
            metadata_valid_for_hours,
            relay_state_policy,
            allow_unsolicited,
            attribute_mapping: Setting::Static(AttributeMapping::default()),
            create_unknown_user: Setting::Static(create_unknown_user),
        };

        Ok(Self {
            host,
            port,
            base_url,
            sp,
        })
    }

    /// Creates a configuration for testing.
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 0,
            base_url: "http://localhost:8080".to_string(),
            sp: SpConfig::for_testing(vec![IdpEntry {
                entity_id: "https://idp.example.com".to_string(),
                display_name: "Example IdP".to_string(),
                sso_url: "https://idp.example.com/sso".to_string(),
                slo_url: "https://idp.example.com/slo".to_string(),
            }]),
        }
    }
}

/// Parses the `FG_IDPS` declaration.
fn parse_idps(raw: &str) -> anyhow::Result<Vec<IdpEntry>> {
    let mut idps = Vec::new();
    for entry in raw.split(',') {
        let entry = entry.trim();
        if entry.is_empty() {
            continue;
        }
        let fields: Vec<&str> = entry.split('|').map(str::trim).collect();
        let [entity_id, display_name, sso_url, slo_url] = fields.as_slice() else {
            anyhow::bail!(
                "malformed FG_IDPS entry {entry:?}: expected entity_id|display_name|sso_url|slo_url"
            );
        };
        idps.push(IdpEntry {
            entity_id: (*entity_id).to_string(),
            display_name: (*display_name).to_string(),
            sso_url: (*sso_url).to_string(),
            slo_url: (*slo_url).to_string(),
        });
    }
    if idps.is_empty() {
        anyhow::bail!("FG_IDPS declares no identity providers");
    }
    Ok(idps)
}
