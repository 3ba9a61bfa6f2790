//! Query-parameter API key authentication.

use std::sync::Arc;

use crate::authenticators::{AuthError, Authenticator, query_param};
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use http::request::Parts;

const DEFAULT_QUERY_PARAM: &str = "apikey";

/// Verifies a token carried in a query-string parameter (default
/// `apikey`), e.g. `GET /report?apikey=<token>`.
///
/// Resolution is identical to Bearer. Keys in URLs end up in access
/// logs and browser history, so this variant suits webhook-style
/// integrations where setting a header is awkward, not interactive use.
pub struct ApiKeyAuthenticator {
    provider: Arc<dyn UserProvider>,
    query_param: String,
    name: AuthenticatorName,
}

impl ApiKeyAuthenticator {
    pub fn new(provider: Arc<dyn UserProvider>) -> Self {
        Self {
            provider,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            name: AuthenticatorName::new("api_key"),
        }
    }

    /// Override the query parameter holding the key.
    pub fn with_query_param(mut self, query_param: impl Into<String>) -> Self {
        self.query_param = query_param.into();
        self
    }

    pub fn query_param(&self) -> &str {
        &self.query_param
    }
}

#[async_trait]
impl Authenticator for ApiKeyAuthenticator {
    fn name(&self) -> &AuthenticatorName {
        &self.name
    }

    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError> {
        let token = match query_param(parts, &self.query_param) {
            Some(token) if !token.is_empty() => token,
            _ => return Ok(AuthenticationResult::anonymous()),
        };

        match self.provider.find_by_token(&token).await? {
            Some(user) => Ok(AuthenticationResult::authenticated(user, self.name.clone())),
            None => Ok(AuthenticationResult::anonymous()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticators::test_parts;
    use crate::provider::InMemoryProvider;
    use crate::user::SimpleUser;

    fn authenticator() -> ApiKeyAuthenticator {
        let provider =
            InMemoryProvider::new().with_user(SimpleUser::new("root@localhost", "Root"));
        ApiKeyAuthenticator::new(Arc::new(provider))
    }

    async fn run(authenticator: &ApiKeyAuthenticator, uri: &str) -> AuthenticationResult {
        let parts = test_parts(http::Request::builder().uri(uri));
        authenticator.authenticate(&parts).await.unwrap()
    }

    #[tokio::test]
    async fn test_valid_key() {
        let result = run(&authenticator(), "/report?apikey=root%40localhost").await;
        assert!(result.is_authenticated());
        assert_eq!(result.user_id(), "root@localhost");
        assert_eq!(result.method().unwrap().as_str(), "api_key");
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let result = run(&authenticator(), "/report?apikey=invalid").await;
        assert!(!result.is_authenticated());
    }

    #[tokio::test]
    async fn test_absent_or_empty_parameter() {
        let authenticator = authenticator();
        assert!(!run(&authenticator, "/report").await.is_authenticated());
        assert!(!run(&authenticator, "/report?other=1").await.is_authenticated());
        assert!(!run(&authenticator, "/report?apikey=").await.is_authenticated());
    }

    #[tokio::test]
    async fn test_custom_parameter_name() {
        let authenticator = authenticator().with_query_param("access_key");
        assert_eq!(authenticator.query_param(), "access_key");

        let result = run(&authenticator, "/report?access_key=root%40localhost").await;
        assert!(result.is_authenticated());

        let result = run(&authenticator, "/report?apikey=root%40localhost").await;
        assert!(!result.is_authenticated());
    }
}
