//! Ordered dispatch over the configured authenticators.

use std::sync::Arc;

use crate::authenticators::Authenticator;
use crate::result::AuthenticationResult;
use http::request::Parts;
use tracing::{debug, warn};

/// First-match-wins dispatch over an ordered authenticator list.
///
/// Registration order is a user-visible contract: when a request could
/// satisfy several schemes, the earliest registered authenticator that
/// actually succeeds wins, and no later authenticator (or its provider)
/// is consulted. An authenticator whose credential is absent or invalid
/// yields anonymous and iteration simply continues.
///
/// Built once at startup and shared read-only across requests.
pub struct AuthenticationPipeline {
    authenticators: Vec<Arc<dyn Authenticator>>,
}

impl std::fmt::Debug for AuthenticationPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticationPipeline")
            .field(
                "authenticators",
                &self
                    .authenticators
                    .iter()
                    .map(|a| a.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl AuthenticationPipeline {
    /// Build a pipeline from an ordered authenticator list.
    ///
    /// An empty list is a configuration mistake and fails here, at
    /// startup, rather than silently answering anonymous per request.
    pub fn new(authenticators: Vec<Arc<dyn Authenticator>>) -> anyhow::Result<Self> {
        if authenticators.is_empty() {
            anyhow::bail!("Authentication pipeline requires at least one authenticator");
        }
        Ok(Self { authenticators })
    }

    /// Run one authentication pass over the request metadata.
    ///
    /// Infallible by design: an authenticator erroring out (provider
    /// outage, internal failure) is logged and treated as that
    /// authenticator not matching; the pass continues and, with every
    /// authenticator exhausted, settles on the anonymous result.
    /// Downstream authorization decides what anonymous may do.
    pub async fn authenticate(&self, parts: &Parts) -> AuthenticationResult {
        for authenticator in &self.authenticators {
            match authenticator.authenticate(parts).await {
                Ok(result) if result.is_authenticated() => {
                    debug!(
                        method = %authenticator.name(),
                        user_id = %result.user_id(),
                        "Request authenticated"
                    );
                    return result;
                }
                Ok(_) => {}
                Err(err) => {
                    warn!(
                        method = %authenticator.name(),
                        "Authenticator failed, continuing with the next one: {}",
                        err
                    );
                }
            }
        }

        debug!("No authenticator matched; request is anonymous");
        AuthenticationResult::anonymous()
    }
}
