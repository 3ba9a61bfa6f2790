//! HTTP Basic authentication (RFC 7617).

use std::sync::Arc;

use crate::authenticators::{AuthError, Authenticator, authorization_header, scheme_payload};
use crate::hashing::SecretVerifier;
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use crate::types::AuthenticatorName;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use http::request::Parts;
use tracing::debug;

/// Verifies `Authorization: Basic <base64(id:secret)>` credentials.
///
/// The only secret-verifying variant: after resolving the identifier it
/// checks the supplied secret against the stored hash through the
/// [`SecretVerifier`] capability. When the identifier does not resolve,
/// one dummy verification is burned so the unknown-user path costs the
/// same as a wrong secret; the response never tells the two apart.
pub struct BasicAuthenticator {
    provider: Arc<dyn UserProvider>,
    verifier: Arc<dyn SecretVerifier>,
    name: AuthenticatorName,
}

impl BasicAuthenticator {
    pub fn new(provider: Arc<dyn UserProvider>, verifier: Arc<dyn SecretVerifier>) -> Self {
        Self {
            provider,
            verifier,
            name: AuthenticatorName::new("basic"),
        }
    }

    /// Decode the payload into `(identifier, secret)`.
    ///
    /// Split on the FIRST colon: the identifier may not contain colons,
    /// the secret may. Invalid base64, a non-UTF-8 payload, or a missing
    /// colon all mean "no credential here".
    fn decode_credential(payload: &str) -> Option<(String, String)> {
        let decoded = BASE64.decode(payload).ok()?;
        let decoded = String::from_utf8(decoded).ok()?;
        let (id, secret) = decoded.split_once(':')?;
        Some((id.to_string(), secret.to_string()))
    }
}

#[async_trait]
impl Authenticator for BasicAuthenticator {
    fn name(&self) -> &AuthenticatorName {
        &self.name
    }

    async fn authenticate(&self, parts: &Parts) -> Result<AuthenticationResult, AuthError> {
        let Some(payload) = authorization_header(parts).and_then(|h| scheme_payload(h, "Basic"))
        else {
            return Ok(AuthenticationResult::anonymous());
        };

        let Some((id, secret)) = Self::decode_credential(payload) else {
            debug!("Basic credential payload is malformed; treating as anonymous");
            return Ok(AuthenticationResult::anonymous());
        };

        let Some(user) = self.provider.find_by_id(&id).await? else {
            // Keep this path as expensive as a failed verification.
            self.verifier.dummy_verify(&secret);
            return Ok(AuthenticationResult::anonymous());
        };

        if !self.verifier.verify(&secret, user.hashed_secret()) {
            debug!(user_id = %id, "Basic secret verification failed");
            return Ok(AuthenticationResult::anonymous());
        }

        Ok(AuthenticationResult::authenticated(user, self.name.clone()))
    }
}
