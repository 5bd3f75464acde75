//! XML namespace prefix registration.
//!
//! Protocol-document serialization uses a fixed prefix table. Registration is
//! an explicit, idempotent initialization step invoked by process startup
//! before any document is serialized, not an import-time side effect.

use std::collections::HashMap;
use std::sync::OnceLock;

use crate::types::constants::{
    NS_SAML_ASSERTION, NS_SAML_METADATA, NS_SAML_PROTOCOL, NS_XMLDSIG, NS_XMLENC,
};

static PREFIXES: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

fn default_table() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        (NS_SAML_ASSERTION, "saml"),
        (NS_SAML_PROTOCOL, "samlp"),
        (NS_SAML_METADATA, "md"),
        (NS_XMLDSIG, "ds"),
        (NS_XMLENC, "xenc"),
    ])
}

/// Installs the namespace prefix table.
///
/// Idempotent: calling more than once is a no-op. Process startup invokes
/// this before serving; serializers fall back to the same table if it was
/// never called, so a missed registration degrades to lazy initialization
/// rather than a failure.
pub fn register_namespace_prefixes() {
    let _ = PREFIXES.get_or_init(default_table);
}

/// Returns the registered prefix for a namespace URI.
///
/// Unknown namespaces get the conventional `ns` prefix.
#[must_use]
pub fn prefix_for(namespace: &str) -> &'static str {
    PREFIXES
        .get_or_init(default_table)
        .get(namespace)
        .copied()
        .unwrap_or("ns")
}
