//! The identity capability and a bundled concrete user type.

use crate::types::Scope;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Minimal capability set any identity object must expose.
///
/// The authentication layer never depends on a concrete user type, only
/// on these four accessors, so an application can plug in its own ORM
/// row or domain struct without copying data into ours. Implementations
/// are read by the layer, never mutated.
pub trait UserLike: fmt::Debug + Send + Sync {
    /// Unique, stable identifier for the principal. Never empty.
    fn id(&self) -> &str;

    /// Human-readable name for display purposes.
    fn display_name(&self) -> &str;

    /// Opaque, algorithm-tagged hash of the principal's secret.
    ///
    /// Empty for identities that only authenticate via tokens.
    fn hashed_secret(&self) -> &str;

    /// Permission tags in insertion order. Duplicates are permitted but
    /// carry no meaning.
    fn scopes(&self) -> &[Scope];

    /// Check whether a scope is present, by exact string match.
    fn has_scope(&self, scope: &str) -> bool {
        self.scopes().iter().any(|s| s.as_str() == scope)
    }
}

/// A plain identity record implementing [`UserLike`].
///
/// Handy for configuration-driven setups and tests; applications with
/// their own user model implement [`UserLike`] directly instead.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimpleUser {
    id: String,
    display_name: String,
    #[serde(default)]
    hashed_secret: String,
    #[serde(default)]
    scopes: Vec<Scope>,
}

impl SimpleUser {
    /// Create a user with no secret and no scopes.
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            hashed_secret: String::new(),
            scopes: Vec::new(),
        }
    }

    /// Set the stored secret hash (a PHC string for the bundled verifier).
    pub fn with_hashed_secret(mut self, hashed_secret: impl Into<String>) -> Self {
        self.hashed_secret = hashed_secret.into();
        self
    }

    /// Set the scope list.
    pub fn with_scopes(mut self, scopes: impl IntoIterator<Item = Scope>) -> Self {
        self.scopes = scopes.into_iter().collect();
        self
    }
}

impl UserLike for SimpleUser {
    fn id(&self) -> &str {
        &self.id
    }

    fn display_name(&self) -> &str {
        &self.display_name
    }

    fn hashed_secret(&self) -> &str {
        &self.hashed_secret
    }

    fn scopes(&self) -> &[Scope] {
        &self.scopes
    }
}
