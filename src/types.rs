//! NewType wrappers for strong typing across the authentication layer.
//!
//! These types prevent accidental mixing of semantically different strings
//! (e.g., passing a scope tag where an authenticator name is expected).

use serde::{Deserialize, Serialize};
use std::fmt;

/// Macro to generate a NewType wrapper with standard trait implementations.
macro_rules! newtype_string {
    (
        $(#[$meta:meta])*
        $name:ident
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Create a new instance.
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            /// Get the inner value as a string slice.
            pub fn as_str(&self) -> &str {
                &self.0
            }

            /// Consume and return the inner String.
            pub fn into_inner(self) -> String {
                self.0
            }
        }

        impl From<String> for $name {
            fn from(s: String) -> Self {
                Self(s)
            }
        }

        impl From<&str> for $name {
            fn from(s: &str) -> Self {
                Self(s.to_string())
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::borrow::Borrow<str> for $name {
            fn borrow(&self) -> &str {
                &self.0
            }
        }
    };
}

newtype_string!(
    /// A permission tag attached to an identity (e.g., "orders:read").
    ///
    /// Scopes are opaque to the authentication layer: it copies them from
    /// the resolved identity into the authentication result and checks
    /// them by exact string match where a feature is scope-guarded
    /// (impersonation). Interpreting them is the application's job.
    Scope
);

newtype_string!(
    /// Name of the authenticator that produced an authentication result.
    ///
    /// Common values: "basic", "bearer", "token", "cookie", "api_key".
    /// Downstream code can branch on this to tell, say, a browser session
    /// from an API integration.
    AuthenticatorName
);
