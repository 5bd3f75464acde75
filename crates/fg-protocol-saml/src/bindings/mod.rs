//! SAML binding codecs.
//!
//! Message transport between SP and IdP uses two bindings:
//!
//! - **HTTP-Redirect** - the message is DEFLATE-compressed, base64-encoded
//!   and URL-encoded into query parameters. The SP sends `AuthnRequest` and
//!   `LogoutRequest`/`LogoutResponse` messages this way and receives the
//!   logout leg of the exchange over it.
//! - **HTTP-POST** - the message is base64-encoded into an HTML form field.
//!   The SP receives authentication responses this way.

mod post;
mod redirect;

pub use post::HttpPostBinding;
pub use redirect::HttpRedirectBinding;

/// SAML message kind, selecting the transport parameter name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SamlMessageKind {
    /// `SAMLRequest` parameter.
    Request,
    /// `SAMLResponse` parameter.
    Response,
}

impl SamlMessageKind {
    /// Returns the query/form parameter name for this kind.
    #[must_use]
    pub const fn param(&self) -> &'static str {
        match self {
            Self::Request => "SAMLRequest",
            Self::Response => "SAMLResponse",
        }
    }
}
