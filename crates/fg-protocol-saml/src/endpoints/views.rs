//! Terminal HTML pages rendered by the SP endpoints.
//!
//! These are deliberately minimal: embedding applications that want branded
//! pages put a template layer in front and keep the protocol endpoints as
//! they are.

use std::collections::HashMap;

use fg_core::config::IdpEntry;

/// Escapes HTML special characters.
pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}

fn page(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset="UTF-8">
    <title>{title}</title>
    <style>
        body {{ font-family: sans-serif; max-width: 40em; margin: 50px auto; }}
    </style>
</head>
<body>
{body}
</body>
</html>"#
    )
}

/// The identity-provider chooser shown when no IdP was selected.
pub fn discovery_page(idps: &[IdpEntry], came_from: &str) -> String {
    let items: String = idps
        .iter()
        .map(|idp| {
            format!(
                r#"        <li><a href="?idp={}&amp;next={}">{}</a></li>
"#,
                urlencoding::encode(&idp.entity_id),
                urlencoding::encode(came_from),
                html_escape(&idp.display_name),
            )
        })
        .collect();

    page(
        "Choose an identity provider",
        &format!(
            r#"    <h1>Choose an identity provider</h1>
    <ul>
{items}    </ul>"#
        ),
    )
}

/// Shown when an already-authenticated caller hits the login endpoint.
pub fn already_authenticated_page(came_from: &str) -> String {
    page(
        "Already signed in",
        &format!(
            r#"    <h1>Already signed in</h1>
    <p>You are already signed in. Continue to <a href="{0}">{0}</a>.</p>"#,
            html_escape(came_from)
        ),
    )
}

/// Diagnostic page for identity-provider selection failures.
pub fn configuration_error_page(detail: &str) -> String {
    page(
        "Sign-in unavailable",
        &format!(
            r#"    <h1>Sign-in unavailable</h1>
    <p>The sign-in request could not be routed to an identity provider.</p>
    <p>{}</p>"#,
            html_escape(detail)
        ),
    )
}

/// Diagnostic page when no local principal could be resolved.
pub fn authentication_error_page() -> String {
    page(
        "Sign-in failed",
        r#"    <h1>Sign-in failed</h1>
    <p>There were problems signing you in. Contact your administrator.</p>"#,
    )
}

/// Generic page for logout exchanges that did not complete.
pub fn logout_failure_page() -> String {
    page(
        "Logout failed",
        r#"    <h1>Logout failed</h1>
    <p>An error occurred during logout. Your session may still be active.</p>"#,
    )
}

/// Shown when an unauthenticated caller hits an authenticated-only endpoint.
pub fn forbidden_page() -> String {
    page(
        "Not signed in",
        r#"    <h1>Not signed in</h1>
    <p>This page requires an authenticated session.</p>"#,
    )
}

/// The attribute-echo page for the current subject.
pub fn attributes_page(subject_id: &str, attributes: &HashMap<String, Vec<String>>) -> String {
    let mut names: Vec<&String> = attributes.keys().collect();
    names.sort();

    let rows: String = names
        .iter()
        .map(|name| {
            let values = attributes[name.as_str()].join(", ");
            format!(
                "        <tr><td>{}</td><td>{}</td></tr>\n",
                html_escape(name),
                html_escape(&values)
            )
        })
        .collect();

    page(
        "Your attributes",
        &format!(
            r#"    <h1>Your attributes</h1>
    <p>Subject: {}</p>
    <table>
{rows}    </table>"#,
            html_escape(subject_id)
        ),
    )
}
