//! The uniform outcome of an authentication pass.

use crate::types::{AuthenticatorName, Scope};
use crate::user::UserLike;
use std::sync::Arc;

/// Outcome bound into the request context by the dispatch pipeline.
///
/// Exactly one of these exists per request: either the canonical
/// anonymous value or a success carrying the resolved identity and the
/// name of the authenticator that produced it. Immutable once created;
/// downstream handlers only read it. Cloning is cheap (the identity is
/// shared, not copied).
#[derive(Debug, Clone)]
pub struct AuthenticationResult {
    user: Option<Arc<dyn UserLike>>,
    method: Option<AuthenticatorName>,
}

impl AuthenticationResult {
    /// The canonical "not authenticated" value.
    pub fn anonymous() -> Self {
        Self {
            user: None,
            method: None,
        }
    }

    /// A successful outcome for `user`, produced by the authenticator
    /// named `method`.
    pub fn authenticated(user: Arc<dyn UserLike>, method: AuthenticatorName) -> Self {
        Self {
            user: Some(user),
            method: Some(method),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// The resolved identity's id, or empty when anonymous.
    pub fn user_id(&self) -> &str {
        self.user.as_deref().map(|u| u.id()).unwrap_or("")
    }

    /// The resolved identity's display name, or empty when anonymous.
    pub fn display_name(&self) -> &str {
        self.user.as_deref().map(|u| u.display_name()).unwrap_or("")
    }

    /// Scopes copied through from the identity; empty when anonymous.
    pub fn scopes(&self) -> &[Scope] {
        self.user.as_deref().map(|u| u.scopes()).unwrap_or(&[])
    }

    /// Name of the authenticator that succeeded, absent when anonymous.
    pub fn method(&self) -> Option<&AuthenticatorName> {
        self.method.as_ref()
    }

    /// The resolved identity itself, for handlers that need more than
    /// the flattened fields.
    pub fn user(&self) -> Option<&Arc<dyn UserLike>> {
        self.user.as_ref()
    }

    /// Check a scope on the bound identity. Always false when anonymous.
    pub fn has_scope(&self, scope: &str) -> bool {
        self.user.as_deref().is_some_and(|u| u.has_scope(scope))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::user::SimpleUser;

    fn root() -> Arc<dyn UserLike> {
        Arc::new(
            SimpleUser::new("root@localhost", "Root").with_scopes([Scope::new("admin")]),
        )
    }

    #[test]
    fn test_anonymous_has_empty_identity_fields() {
        let result = AuthenticationResult::anonymous();

        assert!(!result.is_authenticated());
        assert_eq!(result.user_id(), "");
        assert_eq!(result.display_name(), "");
        assert!(result.scopes().is_empty());
        assert!(result.method().is_none());
        assert!(result.user().is_none());
    }

    #[test]
    fn test_authenticated_copies_identity_fields() {
        let result =
            AuthenticationResult::authenticated(root(), AuthenticatorName::new("bearer"));

        assert!(result.is_authenticated());
        assert_eq!(result.user_id(), "root@localhost");
        assert_eq!(result.display_name(), "Root");
        assert_eq!(result.scopes(), &[Scope::new("admin")]);
        assert_eq!(result.method().unwrap().as_str(), "bearer");
        assert!(result.user().is_some());
    }

    #[test]
    fn test_has_scope() {
        let result =
            AuthenticationResult::authenticated(root(), AuthenticatorName::new("basic"));

        assert!(result.has_scope("admin"));
        assert!(!result.has_scope("guest"));
        assert!(!AuthenticationResult::anonymous().has_scope("admin"));
    }

    #[test]
    fn test_clone_shares_identity() {
        let result =
            AuthenticationResult::authenticated(root(), AuthenticatorName::new("bearer"));
        let copy = result.clone();

        let a = result.user().unwrap();
        let b = copy.user().unwrap();
        assert!(Arc::ptr_eq(a, b));
    }
}
