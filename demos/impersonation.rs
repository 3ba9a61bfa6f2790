//! Token authentication plus scope-guarded impersonation.
//!
//! ```text
//! cargo run --example impersonation
//! curl -H 'Authorization: Token root@localhost' http://localhost:7000/
//! curl -H 'Authorization: Token root@localhost' \
//!     'http://localhost:7000/?_impersonate=customer@localhost'
//! curl -H 'Authorization: Token customer@localhost' \
//!     'http://localhost:7000/?_impersonate=root@localhost'   # refused
//! ```

use std::sync::Arc;

use anyhow::Result;
use axum::{Extension, Json, Router, routing::get};
use portcullis::{
    Auth, AuthenticationLayer, AuthenticationPipeline, ImpersonationLayer, Impersonator,
    InMemoryProvider, Scope, SimpleUser, TokenAuthenticator,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn whoami(
    Auth(auth): Auth,
    impersonator: Option<Extension<Impersonator>>,
) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "is_authenticated": auth.is_authenticated(),
        "id": auth.user_id(),
        "name": auth.display_name(),
        "scopes": auth.scopes(),
        "impersonated_by": impersonator.map(|Extension(i)| i.0.user_id().to_string()),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("portcullis=debug".parse()?),
        )
        .init();

    let provider = Arc::new(
        InMemoryProvider::new()
            .with_user(
                SimpleUser::new("root@localhost", "Root")
                    .with_scopes([Scope::new("auth:impersonate_others")]),
            )
            .with_user(SimpleUser::new("customer@localhost", "Customer")),
    );
    let pipeline =
        AuthenticationPipeline::new(vec![Arc::new(TokenAuthenticator::new(provider.clone()))])?;

    // Impersonation sits below authentication so it sees the bound result.
    let app = Router::new().route("/", get(whoami)).layer(
        ServiceBuilder::new()
            .layer(TraceLayer::new_for_http())
            .layer(CorsLayer::permissive())
            .layer(AuthenticationLayer::new(pipeline))
            .layer(ImpersonationLayer::new(provider)),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:7000").await?;
    info!("Listening on http://127.0.0.1:7000");
    info!("Try: curl -H 'Authorization: Token root@localhost' 'http://localhost:7000/?_impersonate=customer@localhost'");
    axum::serve(listener, app).await?;

    Ok(())
}
