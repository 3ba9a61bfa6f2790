//! Tower middleware binding the authentication result to each request.

use std::{
    future::Future,
    pin::Pin,
    sync::Arc,
    task::{Context, Poll},
};

use crate::pipeline::AuthenticationPipeline;
use crate::result::AuthenticationResult;
use axum::{
    body::Body,
    extract::{FromRequestParts, Request},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower::{Layer, Service};

/// Layer that runs the authentication pipeline once per request.
///
/// Apply it ahead of the routes that read the result:
///
/// ```ignore
/// let router = router.layer(AuthenticationLayer::new(pipeline));
/// ```
///
/// The bound result lands in the request's extensions as a typed slot;
/// applying the layer twice replaces the slot on the second pass rather
/// than accumulating results.
#[derive(Clone)]
pub struct AuthenticationLayer {
    pipeline: Arc<AuthenticationPipeline>,
}

impl AuthenticationLayer {
    pub fn new(pipeline: AuthenticationPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }

    pub fn from_shared(pipeline: Arc<AuthenticationPipeline>) -> Self {
        Self { pipeline }
    }
}

impl<S> Layer<S> for AuthenticationLayer {
    type Service = AuthenticationService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthenticationService {
            inner,
            pipeline: self.pipeline.clone(),
        }
    }
}

/// Service produced by [`AuthenticationLayer`].
///
/// Runs the pipeline over the request metadata, inserts the resulting
/// [`AuthenticationResult`] into the extensions, then calls the inner
/// service. Never rejects a request itself; an unauthenticated request
/// proceeds carrying the anonymous result.
#[derive(Clone)]
pub struct AuthenticationService<S> {
    inner: S,
    pipeline: Arc<AuthenticationPipeline>,
}

impl<S> Service<Request<Body>> for AuthenticationService<S>
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
        let pipeline = self.pipeline.clone();
        // The clone is the not-ready instance; keep the one poll_ready
        // vouched for.
        let not_ready_inner = self.inner.clone();
        let mut ready_inner = std::mem::replace(&mut self.inner, not_ready_inner);

        Box::pin(async move {
            let (mut parts, body) = request.into_parts();
            let result = pipeline.authenticate(&parts).await;
            parts.extensions.insert(result);
            ready_inner.call(Request::from_parts(parts, body)).await
        })
    }
}

/// Extractor handing the bound [`AuthenticationResult`] to handlers.
///
/// ```ignore
/// async fn whoami(Auth(auth): Auth) -> Json<Value> { ... }
/// ```
///
/// Rejects with 500 when the layer never ran: that is a wiring mistake
/// in the application, not a property of the request.
#[derive(Debug, Clone)]
pub struct Auth(pub AuthenticationResult);

/// Rejection for [`Auth`] when [`AuthenticationLayer`] is not installed.
#[derive(Debug, Clone)]
pub struct AuthLayerMissing;

impl IntoResponse for AuthLayerMissing {
    fn into_response(self) -> Response {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication layer not configured for this route",
        )
            .into_response()
    }
}

impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = AuthLayerMissing;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticationResult>()
            .cloned()
            .map(Auth)
            .ok_or(AuthLayerMissing)
    }
}
