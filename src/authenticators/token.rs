//! Named-scheme token authentication.

use std::sync::Arc;

use crate::authenticators::{AuthError, Authenticator, authorization_header, scheme_payload};
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use http::request::Parts;

const DEFAULT_SCHEME: &str = "Token";

/// Verifies `Authorization: <scheme> <token>` with a configurable
/// scheme word (default `Token`).
///
/// Behaves exactly like [`BearerAuthenticator`] apart from the scheme
/// word, which is per-instance configuration, not identity: the method
/// reported on success is always `token`.
///
/// [`BearerAuthenticator`]: crate::authenticators::BearerAuthenticator
pub struct TokenAuthenticator {
    provider: Arc<dyn UserProvider>,
    scheme: String,
    name: AuthenticatorName,
}

impl TokenAuthenticator {
    pub fn new(provider: Arc<dyn UserProvider>) -> Self {
        Self {
            provider,
            scheme: DEFAULT_SCHEME.to_string(),
            name: AuthenticatorName::new("token"),
        }
    }

    /// Override the scheme word matched in the `Authorization` header.
    pub fn with_scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = scheme.into();
        self
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }
}

#[async_trait]
impl Authenticator for TokenAuthenticator {
    fn name(&self) -> &AuthenticatorName {
        &self.name
    }

    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError> {
        let Some(token) =
            authorization_header(parts).and_then(|h| scheme_payload(h, &self.scheme))
        else {
            return Ok(AuthenticationResult::anonymous());
        };

        match self.provider.find_by_token(token).await? {
            Some(user) => Ok(AuthenticationResult::authenticated(user, self.name.clone())),
            None => Ok(AuthenticationResult::anonymous()),
        }
    }
}
