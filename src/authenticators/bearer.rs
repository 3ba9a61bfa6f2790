//! Bearer token authentication (RFC 6750 shape).

use std::sync::Arc;

use crate::authenticators::{AuthError, Authenticator, authorization_header, scheme_payload};
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use http::request::Parts;

/// Verifies `Authorization: Bearer <token>` credentials.
///
/// The scheme word is matched case-sensitively; any other scheme,
/// including none at all, leaves the request anonymous. The token is
/// opaque here: the bound provider decides what it maps to.
pub struct BearerAuthenticator {
    provider: Arc<dyn UserProvider>,
    name: AuthenticatorName,
}

impl BearerAuthenticator {
    pub fn new(provider: Arc<dyn UserProvider>) -> Self {
        Self {
            provider,
            name: AuthenticatorName::new("bearer"),
        }
    }
}

#[async_trait]
impl Authenticator for BearerAuthenticator {
    fn name(&self) -> &AuthenticatorName {
        &self.name
    }

    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError> {
        let Some(token) = authorization_header(parts).and_then(|h| scheme_payload(h, "Bearer"))
        else {
            return Ok(AuthenticationResult::anonymous());
        };

        match self.provider.find_by_token(token).await? {
            Some(user) => Ok(AuthenticationResult::authenticated(user, self.name.clone())),
            None => Ok(AuthenticationResult::anonymous()),
        }
    }
}
