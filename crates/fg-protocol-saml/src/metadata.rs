//! SP metadata generation.
//!
//! Serializes this service provider's entity descriptor: entity ID, the
//! assertion consumer service (HTTP-POST) and the single logout service
//! (HTTP-Redirect), bounded by a `validUntil` window.

use chrono::{Duration, Utc};

use fg_core::config::SpConfig;

use crate::error::SpResult;
use crate::types::constants::{
    format_instant, NAMEID_FORMAT_UNSPECIFIED, NS_SAML_METADATA,
};
use crate::types::SamlBinding;
use crate::xmlns;

/// Generates the SP entity descriptor XML.
pub fn entity_descriptor(config: &SpConfig, valid_for_hours: u32) -> SpResult<String> {
    let md = xmlns::prefix_for(NS_SAML_METADATA);
    let valid_until = Utc::now() + Duration::hours(i64::from(valid_for_hours));

    Ok(format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<{md}:EntityDescriptor xmlns:{md}="{metadata_ns}" entityID="{entity_id}" validUntil="{valid_until}">
    <{md}:SPSSODescriptor AuthnRequestsSigned="false" WantAssertionsSigned="false" protocolSupportEnumeration="urn:oasis:names:tc:SAML:2.0:protocol">
        <{md}:SingleLogoutService Binding="{redirect_binding}" Location="{sls_url}"/>
        <{md}:NameIDFormat>{nameid_format}</{md}:NameIDFormat>
        <{md}:AssertionConsumerService Binding="{post_binding}" Location="{acs_url}" index="0" isDefault="true"/>
    </{md}:SPSSODescriptor>
</{md}:EntityDescriptor>"#,
        md = md,
        metadata_ns = NS_SAML_METADATA,
        entity_id = config.entity_id,
        valid_until = format_instant(valid_until),
        redirect_binding = SamlBinding::HttpRedirect.uri(),
        sls_url = config.sls_url,
        nameid_format = NAMEID_FORMAT_UNSPECIFIED,
        post_binding = SamlBinding::HttpPost.uri(),
        acs_url = config.acs_url,
    ))
}
