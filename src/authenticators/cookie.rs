//! Session-cookie token authentication.

use std::sync::Arc;

use crate::authenticators::{AuthError, Authenticator};
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use axum_extra::extract::CookieJar;
use http::request::Parts;

const DEFAULT_COOKIE: &str = "auth_token";

/// Verifies a token carried in a named cookie (default `auth_token`).
///
/// The resolution path is identical to Bearer; only the transport
/// differs. Issuing and expiring the cookie is the application's job,
/// this authenticator only reads it.
pub struct CookieAuthenticator {
    provider: Arc<dyn UserProvider>,
    cookie_name: String,
    name: AuthenticatorName,
}

impl CookieAuthenticator {
    pub fn new(provider: Arc<dyn UserProvider>) -> Self {
        Self {
            provider,
            cookie_name: DEFAULT_COOKIE.to_string(),
            name: AuthenticatorName::new("cookie"),
        }
    }

    /// Override the name of the cookie holding the token.
    pub fn with_cookie_name(mut self, cookie_name: impl Into<String>) -> Self {
        self.cookie_name = cookie_name.into();
        self
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }
}

#[async_trait]
impl Authenticator for CookieAuthenticator {
    fn name(&self) -> &AuthenticatorName {
        &self.name
    }

    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError> {
        let jar = CookieJar::from_headers(&parts.headers);
        let token = match jar.get(&self.cookie_name) {
            Some(cookie) if !cookie.value().is_empty() => cookie.value().to_string(),
            _ => return Ok(AuthenticationResult::anonymous()),
        };

        match self.provider.find_by_token(&token).await? {
            Some(user) => Ok(AuthenticationResult::authenticated(user, self.name.clone())),
            None => Ok(AuthenticationResult::anonymous()),
        }
    }
}
