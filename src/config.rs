//! JSON configuration for building a pipeline without code changes.
//!
//! A config file carries a `users` map and an ordered `authenticators`
//! list; `${VAR}` references inside hashed-secret values are expanded
//! from the environment so the file itself can stay out of secret
//! management. Misconfiguration (unknown authenticator type, empty
//! list) fails the build at startup, never per request.
//!
//! ```json
//! {
//!   "users": {
//!     "root@localhost": {
//!       "display_name": "Root",
//!       "hashed_secret": "${ROOT_PASSWORD_HASH}",
//!       "scopes": ["auth:impersonate_others"]
//!     }
//!   },
//!   "authenticators": [
//!     { "type": "basic" },
//!     { "type": "token", "scheme": "ApiToken" }
//!   ]
//! }
//! ```

use std::{collections::BTreeMap, env, fs, path::Path, sync::Arc};

use crate::authenticators::{
    ApiKeyAuthenticator, Authenticator, BasicAuthenticator, BearerAuthenticator,
    CookieAuthenticator, TokenAuthenticator,
};
use crate::hashing::{PhcSecretVerifier, SecretVerifier};
use crate::pipeline::AuthenticationPipeline;
use crate::provider::{InMemoryProvider, UserProvider};
use crate::types::Scope;
use crate::user::SimpleUser;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct PipelineConfig {
    #[serde(default)]
    pub users: BTreeMap<String, UserConfig>,
    #[serde(default)]
    pub authenticators: Vec<AuthenticatorConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UserConfig {
    pub display_name: String,
    #[serde(default)]
    pub hashed_secret: Option<String>,
    #[serde(default)]
    pub scopes: Vec<String>,
}

/// One raw `authenticators` entry, before validation.
#[derive(Debug, Deserialize, Clone)]
pub struct AuthenticatorConfig {
    #[serde(rename = "type")]
    pub kind: String,

    // token
    #[serde(default)]
    pub scheme: Option<String>,

    // cookie
    #[serde(default)]
    pub cookie: Option<String>,

    // api_key
    #[serde(default)]
    pub query_param: Option<String>,
}

/// A validated authenticator entry.
#[derive(Debug, Clone)]
pub enum AuthenticatorSpec {
    Basic,
    Bearer,
    Token { scheme: Option<String> },
    Cookie { cookie: Option<String> },
    ApiKey { query_param: Option<String> },
}

impl AuthenticatorSpec {
    pub fn from_json(cfg: AuthenticatorConfig) -> anyhow::Result<Self> {
        match cfg.kind.as_str() {
            "basic" => Ok(Self::Basic),
            "bearer" => Ok(Self::Bearer),
            "token" => Ok(Self::Token { scheme: cfg.scheme }),
            "cookie" => Ok(Self::Cookie { cookie: cfg.cookie }),
            "api_key" => Ok(Self::ApiKey {
                query_param: cfg.query_param,
            }),
            other => Err(anyhow::anyhow!(
                "Unknown authenticator type `{}` (expected one of: basic, bearer, token, cookie, api_key)",
                other
            )),
        }
    }

    fn instantiate(
        self,
        provider: Arc<dyn UserProvider>,
        verifier: Arc<dyn SecretVerifier>,
    ) -> Arc<dyn Authenticator> {
        match self {
            Self::Basic => Arc::new(BasicAuthenticator::new(provider, verifier)),
            Self::Bearer => Arc::new(BearerAuthenticator::new(provider)),
            Self::Token { scheme } => {
                let authenticator = TokenAuthenticator::new(provider);
                Arc::new(match scheme {
                    Some(scheme) => authenticator.with_scheme(scheme),
                    None => authenticator,
                })
            }
            Self::Cookie { cookie } => {
                let authenticator = CookieAuthenticator::new(provider);
                Arc::new(match cookie {
                    Some(cookie) => authenticator.with_cookie_name(cookie),
                    None => authenticator,
                })
            }
            Self::ApiKey { query_param } => {
                let authenticator = ApiKeyAuthenticator::new(provider);
                Arc::new(match query_param {
                    Some(query_param) => authenticator.with_query_param(query_param),
                    None => authenticator,
                })
            }
        }
    }
}

impl PipelineConfig {
    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let raw = fs::read_to_string(path.as_ref())?;
        Self::from_json(&raw)
    }

    /// Build the configured provider, verifier, and ordered pipeline.
    ///
    /// Fails when the authenticator list is empty or an entry does not
    /// validate; both are startup-time mistakes.
    pub fn build(self) -> anyhow::Result<AuthenticationPipeline> {
        let mut provider = InMemoryProvider::new();
        for (id, user) in self.users {
            let hashed_secret = user
                .hashed_secret
                .map(|h| expand_env_vars(&h))
                .unwrap_or_default();
            provider = provider.with_user(
                SimpleUser::new(id, user.display_name)
                    .with_hashed_secret(hashed_secret)
                    .with_scopes(user.scopes.into_iter().map(Scope::new)),
            );
        }

        let provider: Arc<dyn UserProvider> = Arc::new(provider);
        let verifier: Arc<dyn SecretVerifier> = Arc::new(PhcSecretVerifier::new());

        let mut authenticators = Vec::with_capacity(self.authenticators.len());
        for entry in self.authenticators {
            let spec = AuthenticatorSpec::from_json(entry)?;
            authenticators.push(spec.instantiate(provider.clone(), verifier.clone()));
        }

        AuthenticationPipeline::new(authenticators)
    }
}

/// Load a config file and build the pipeline in one call.
pub fn load_pipeline(path: impl AsRef<Path>) -> anyhow::Result<AuthenticationPipeline> {
    PipelineConfig::from_file(path)?.build()
}

fn expand_env_vars(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next(); // consume '{'
            let mut name = String::new();
            while let Some(c) = chars.next() {
                if c == '}' {
                    break;
                }
                name.push(c);
            }
            if let Ok(val) = env::var(&name) {
                out.push_str(&val);
            } else {
                out.push_str("${");
                out.push_str(&name);
                out.push('}');
            }
        } else {
            out.push(ch);
        }
    }

    out
}
