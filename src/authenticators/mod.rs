//! Credential-checking strategies.
//!
//! Each authenticator knows how to pull one kind of credential out of a
//! request and resolve it through a [`UserProvider`]. All of them follow
//! the same protocol: a missing, malformed, or unknown credential yields
//! the anonymous result, never an error. Errors are reserved for the
//! provider genuinely failing mid-lookup; the dispatch pipeline catches
//! those and degrades to anonymous.

use std::fmt;

use crate::provider::ProviderError;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use http::header;
use http::request::Parts;

mod api_key;
mod basic;
mod bearer;
mod cookie;
mod token;

pub use api_key::ApiKeyAuthenticator;
pub use basic::BasicAuthenticator;
pub use bearer::BearerAuthenticator;
pub use cookie::CookieAuthenticator;
pub use token::TokenAuthenticator;

/// Errors an authenticator can surface to the pipeline.
///
/// Credential problems are never errors (they map to the anonymous
/// result); these variants cover the identity store failing mid-lookup
/// or an internal invariant breaking.
#[derive(Debug, Clone)]
pub enum AuthError {
    /// The bound user provider failed for reasons other than "no match".
    Provider(ProviderError),
    /// Anything else that prevented the attempt from completing.
    Internal(String),
}

impl fmt::Display for AuthError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Provider(err) => write!(f, "Provider lookup failed: {}", err),
            Self::Internal(msg) => write!(f, "Internal authentication error: {}", msg),
        }
    }
}

impl std::error::Error for AuthError {}

impl From<ProviderError> for AuthError {
    fn from(err: ProviderError) -> Self {
        Self::Provider(err)
    }
}

/// Polymorphic credential-verification strategy.
///
/// Implementations read request metadata only (headers, cookies, query
/// string); they never consume the body and never mutate the request.
/// Safe for concurrent invocation across in-flight requests.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Stable name reported as `method` on a successful result.
    fn name(&self) -> &AuthenticatorName;

    /// Run one authentication attempt against the request metadata.
    ///
    /// Every credential-shaped failure terminates in
    /// [`AuthenticationResult::anonymous`]; `Err` means the attempt
    /// itself could not complete (provider outage and the like).
    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError>;
}

/// The `Authorization` header as a string, if present and valid UTF-8.
pub(crate) fn authorization_header(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
}

/// Split `<scheme> <payload>` and return the payload when the scheme
/// word matches exactly (case-sensitive).
///
/// A header with no space, a mismatched scheme word, or an empty payload
/// yields `None`. The payload is everything after the first space, so a
/// Basic payload containing `=` padding or a token with embedded spaces
/// passes through untouched.
pub(crate) fn scheme_payload<'a>(header: &'a str, scheme: &str) -> Option<&'a str> {
    let (word, payload) = header.split_once(' ')?;
    if word != scheme || payload.is_empty() {
        return None;
    }
    Some(payload)
}

/// First value of a query-string parameter, percent-decoded.
pub(crate) fn query_param(parts: &Parts, name: &str) -> Option<String> {
    let query = parts.uri.query()?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

#[cfg(test)]
pub(crate) fn test_parts(builder: http::request::Builder) -> Parts {
    builder.body(()).unwrap().into_parts().0
}
