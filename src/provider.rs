//! Pluggable identity lookup.
//!
//! Authenticators resolve credentials through a [`UserProvider`]. The
//! bundled [`InMemoryProvider`] is a map loaded at startup; production
//! deployments implement the trait over their own store (database,
//! directory service) and plug it in unchanged.

use crate::user::UserLike;
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Errors a provider can raise for reasons other than "no such user".
///
/// "Not found" is never an error: lookups return `Ok(None)` for it. These
/// variants exist for backends that can genuinely fail mid-lookup; the
/// dispatch pipeline treats both the same (degrade to anonymous), the
/// distinction is for operators reading logs.
#[derive(Debug, Clone)]
pub enum ProviderError {
    /// The backing store could not be reached.
    Unavailable(String),

    /// The store answered, but the record could not be decoded.
    Invalid(String),
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable(msg) => write!(f, "User store unavailable: {}", msg),
            Self::Invalid(msg) => write!(f, "User record invalid: {}", msg),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<anyhow::Error> for ProviderError {
    fn from(err: anyhow::Error) -> Self {
        Self::Unavailable(err.to_string())
    }
}

/// Polymorphic identity lookup service.
///
/// Lookups are pure reads and must be safe under concurrent invocation
/// from many in-flight requests. Implementations own any I/O timeouts;
/// the authentication layer performs no retries.
#[async_trait]
pub trait UserProvider: Send + Sync {
    /// Look up an identity by its stable id.
    async fn find_by_id(&self, id: &str) -> Result<Option<Arc<dyn UserLike>>, ProviderError>;

    /// Look up an identity by an opaque token.
    async fn find_by_token(&self, token: &str) -> Result<Option<Arc<dyn UserLike>>, ProviderError>;
}

/// Map-backed provider for configuration-driven setups and tests.
///
/// One map, keyed by user id, serves both id and token lookups: a token
/// here is simply the user's id. The map is immutable after startup, so
/// concurrent lookups share it without locking.
#[derive(Debug, Clone, Default)]
pub struct InMemoryProvider {
    users: HashMap<String, Arc<dyn UserLike>>,
}

impl InMemoryProvider {
    /// Create an empty provider.
    pub fn new() -> Self {
        Self {
            users: HashMap::new(),
        }
    }

    /// Add a user, keyed by its id.
    pub fn with_user(mut self, user: impl UserLike + 'static) -> Self {
        self.users.insert(user.id().to_string(), Arc::new(user));
        self
    }

    /// Number of users loaded.
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the provider holds no users at all.
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserProvider for InMemoryProvider {
    async fn find_by_id(&self, id: &str) -> Result<Option<Arc<dyn UserLike>>, ProviderError> {
        Ok(self.users.get(id).cloned())
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Arc<dyn UserLike>>, ProviderError> {
        Ok(self.users.get(token).cloned())
    }
}
