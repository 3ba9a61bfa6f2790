//! Scope-guarded per-request identity substitution.
//!
//! Support engineers debugging a customer issue can act as that
//! customer for one request by adding `?_impersonate=<user id>` to the
//! URL, provided their own identity carries the impersonation scope.
//! Nothing persists between requests, so "stop impersonating" is simply
//! omitting the parameter; the `__exit__` sentinel is accepted for
//! symmetry with clients that always send it.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use crate::authenticators::query_param;
use crate::provider::UserProvider;
use crate::result::AuthenticationResult;
use axum::{body::Body, extract::Request, response::Response};
use tower::{Layer, Service};
use tracing::{debug, warn};

const DEFAULT_QUERY_PARAM: &str = "_impersonate";
const DEFAULT_SCOPE: &str = "auth:impersonate_others";
const EXIT_SENTINEL: &str = "__exit__";

/// The original caller's result, kept in extensions while a request is
/// impersonating someone else. Audit trails should record both.
#[derive(Debug, Clone)]
pub struct Impersonator(pub AuthenticationResult);

/// Layer swapping the bound identity for a privileged caller.
///
/// Must run AFTER [`AuthenticationLayer`] in request order; with
/// `ServiceBuilder` that means adding it below the authentication
/// layer:
///
/// ```ignore
/// ServiceBuilder::new()
///     .layer(AuthenticationLayer::new(pipeline))
///     .layer(ImpersonationLayer::new(provider))
/// ```
///
/// Refused or unresolvable attempts log at `warn` and leave the bound
/// result untouched; the response gives a probing caller nothing.
///
/// [`AuthenticationLayer`]: crate::middleware::AuthenticationLayer
#[derive(Clone)]
pub struct ImpersonationLayer {
    provider: Arc<dyn UserProvider>,
    query_param: String,
    scope: String,
}

impl ImpersonationLayer {
    pub fn new(provider: Arc<dyn UserProvider>) -> Self {
        Self {
            provider,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            scope: DEFAULT_SCOPE.to_string(),
        }
    }

    /// Override the query parameter naming the impersonation target.
    pub fn with_query_param(mut self, query_param: impl Into<String>) -> Self {
        self.query_param = query_param.into();
        self
    }

    /// Override the scope required to impersonate.
    pub fn with_scope(mut self, scope: impl Into<String>) -> Self {
        self.scope = scope.into();
        self
    }
}

struct ImpersonationState {
    provider: Arc<dyn UserProvider>,
    query_param: String,
    scope: String,
}

impl<S> Layer<S> for ImpersonationLayer {
    type Service = ImpersonationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ImpersonationService {
            inner,
            state: Arc::new(ImpersonationState {
                provider: self.provider.clone(),
                query_param: self.query_param.clone(),
                scope: self.scope.clone(),
            }),
        }
    }
}

/// Service produced by [`ImpersonationLayer`].
#[derive(Clone)]
pub struct ImpersonationService<S> {
    inner: S,
    state: Arc<ImpersonationState>,
}

impl<S> Service<Request<Body>> for ImpersonationService<S>
where
    S: Service<Request<Body>, Response = Response> + Clone + Send + 'static,
    S::Future: Send,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let state = self.state.clone();
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();

            if let Some(target) = query_param(&parts, &state.query_param)
                && target != EXIT_SENTINEL
                && !target.is_empty()
            {
                apply_impersonation(&state, &mut parts, &target).await;
            }

            ready_inner.call(Request::from_parts(parts, body)).await
        })
    }
}

async fn apply_impersonation(
    state: &ImpersonationState,
    parts: &mut http::request::Parts,
    target: &str,
) {
    let Some(current) = parts.extensions.get::<AuthenticationResult>().cloned() else {
        warn!(
            "Impersonation requested but no authentication result is bound; \
             install the authentication layer ahead of this one"
        );
        return;
    };

    if !current.has_scope(&state.scope) {
        warn!(
            caller = %current.user_id(),
            target = %target,
            "Impersonation refused: caller lacks the required scope"
        );
        return;
    }

    // has_scope implies an authenticated result, which carries a method.
    let Some(method) = current.method().cloned() else {
        return;
    };

    match state.provider.find_by_id(target).await {
        Ok(Some(user)) => {
            debug!(caller = %current.user_id(), target = %target, "Impersonation applied");
            parts.extensions.insert(Impersonator(current));
            parts
                .extensions
                .insert(AuthenticationResult::authenticated(user, method));
        }
        Ok(None) => {
            warn!(
                caller = %current.user_id(),
                target = %target,
                "Impersonation target does not resolve; leaving identity unchanged"
            );
        }
        Err(err) => {
            warn!(
                caller = %current.user_id(),
                target = %target,
                "Impersonation lookup failed, leaving identity unchanged: {}",
                err
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::authenticators::TokenAuthenticator;
    use crate::middleware::{Auth, AuthenticationLayer};
    use crate::pipeline::AuthenticationPipeline;
    use crate::provider::InMemoryProvider;
    use crate::types::Scope;
    use crate::user::SimpleUser;
    use axum::{Extension, Json, Router, http::StatusCode, routing::get};
    use tower::{ServiceBuilder, ServiceExt};

    async fn whoami(
        Auth(auth): Auth,
        impersonator: Option<Extension<Impersonator>>,
    ) -> Json<serde_json::Value> {
        Json(serde_json::json!({
            "is_authenticated": auth.is_authenticated(),
            "user_id": auth.user_id(),
            "impersonator": impersonator.map(|Extension(i)| i.0.user_id().to_string()),
        }))
    }

    fn app() -> Router {
        let provider = Arc::new(
            InMemoryProvider::new()
                .with_user(
                    SimpleUser::new("root@localhost", "Root")
                        .with_scopes([Scope::new("auth:impersonate_others")]),
                )
                .with_user(SimpleUser::new("customer@localhost", "Customer")),
        );
        let pipeline =
            AuthenticationPipeline::new(vec![Arc::new(TokenAuthenticator::new(provider.clone()))])
                .unwrap();

        Router::new().route("/whoami", get(whoami)).layer(
            ServiceBuilder::new()
                .layer(AuthenticationLayer::new(pipeline))
                .layer(ImpersonationLayer::new(provider)),
        )
    }

    async fn get_json(app: Router, uri: &str, token: Option<&str>) -> serde_json::Value {
        let builder = Request::builder().uri(uri);
        let builder = match token {
            Some(token) => builder.header("authorization", format!("Token {}", token)),
            None => builder,
        };
        let response = app
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_privileged_caller_impersonates_target() {
        let json = get_json(
            app(),
            "/whoami?_impersonate=customer%40localhost",
            Some("root@localhost"),
        )
        .await;

        assert_eq!(json["user_id"], "customer@localhost");
        assert_eq!(json["impersonator"], "root@localhost");
    }

    #[tokio::test]
    async fn test_caller_without_scope_is_refused() {
        let json = get_json(
            app(),
            "/whoami?_impersonate=root%40localhost",
            Some("customer@localhost"),
        )
        .await;

        assert_eq!(json["user_id"], "customer@localhost");
        assert!(json["impersonator"].is_null());
    }

    #[tokio::test]
    async fn test_anonymous_caller_is_refused() {
        let json = get_json(app(), "/whoami?_impersonate=customer%40localhost", None).await;

        assert_eq!(json["is_authenticated"], false);
        assert!(json["impersonator"].is_null());
    }

    #[tokio::test]
    async fn test_exit_sentinel_and_absent_parameter_are_noops() {
        let json = get_json(
            app(),
            "/whoami?_impersonate=__exit__",
            Some("root@localhost"),
        )
        .await;
        assert_eq!(json["user_id"], "root@localhost");
        assert!(json["impersonator"].is_null());

        let json = get_json(app(), "/whoami", Some("root@localhost")).await;
        assert_eq!(json["user_id"], "root@localhost");
        assert!(json["impersonator"].is_null());
    }

    #[tokio::test]
    async fn test_unresolvable_target_leaves_identity_unchanged() {
        let json = get_json(
            app(),
            "/whoami?_impersonate=nobody%40localhost",
            Some("root@localhost"),
        )
        .await;

        assert_eq!(json["user_id"], "root@localhost");
        assert!(json["impersonator"].is_null());
    }

    #[tokio::test]
    async fn test_custom_parameter_and_scope() {
        let provider = Arc::new(
            InMemoryProvider::new()
                .with_user(
                    SimpleUser::new("ops@localhost", "Ops")
                        .with_scopes([Scope::new("support:act_as")]),
                )
                .with_user(SimpleUser::new("customer@localhost", "Customer")),
        );
        let pipeline =
            AuthenticationPipeline::new(vec![Arc::new(TokenAuthenticator::new(provider.clone()))])
                .unwrap();
        let app = Router::new().route("/whoami", get(whoami)).layer(
            ServiceBuilder::new()
                .layer(AuthenticationLayer::new(pipeline))
                .layer(
                    ImpersonationLayer::new(provider)
                        .with_query_param("_act_as")
                        .with_scope("support:act_as"),
                ),
        );

        let json = get_json(app, "/whoami?_act_as=customer%40localhost", Some("ops@localhost"))
            .await;
        assert_eq!(json["user_id"], "customer@localhost");
        assert_eq!(json["impersonator"], "ops@localhost");
    }
}
