//! Pluggable request authentication for axum/tower backends.
//!
//! The crate answers one question per request: who is calling? An
//! ordered list of [`Authenticator`] strategies (HTTP Basic, Bearer,
//! named token, cookie, query-parameter API key) each extract one kind
//! of credential and resolve it through a [`UserProvider`]; the
//! [`AuthenticationPipeline`] tries them in registration order and the
//! first success wins. The resulting [`AuthenticationResult`] (or the
//! canonical anonymous value) is bound into the request's extensions by
//! [`AuthenticationLayer`] before application handlers run, where the
//! [`Auth`] extractor hands it over. Authorization stays with the
//! application; this crate only establishes identity.
//!
//! ```ignore
//! let provider = Arc::new(InMemoryProvider::new().with_user(user));
//! let pipeline = AuthenticationPipeline::new(vec![
//!     Arc::new(BasicAuthenticator::new(provider.clone(), verifier)),
//!     Arc::new(BearerAuthenticator::new(provider)),
//! ])?;
//! let app = Router::new()
//!     .route("/whoami", get(whoami))
//!     .layer(AuthenticationLayer::new(pipeline));
//! ```

pub mod authenticators;
pub mod config;
pub mod hashing;
pub mod impersonation;
pub mod middleware;
pub mod pipeline;
pub mod provider;
pub mod result;
pub mod types;
pub mod user;


// Re-export the types most applications touch.
pub use authenticators::{
    ApiKeyAuthenticator, AuthError, Authenticator, BasicAuthenticator, BearerAuthenticator,
    CookieAuthenticator, TokenAuthenticator,
};
pub use config::{PipelineConfig, load_pipeline};
pub use hashing::{PhcSecretVerifier, SecretVerifier};
pub use impersonation::{ImpersonationLayer, Impersonator};
pub use middleware::{Auth, AuthenticationLayer};
pub use pipeline::AuthenticationPipeline;
pub use provider::{InMemoryProvider, ProviderError, UserProvider};
pub use result::AuthenticationResult;
pub use types::{AuthenticatorName, Scope};
pub use user::{SimpleUser, UserLike};
