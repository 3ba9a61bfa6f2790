//! HTTP Basic authentication against an in-memory user.
//!
//! ```text
//! cargo run --example httpbasic
//! curl --user 'root@localhost:pa$$word' http://localhost:7000/
//! curl http://localhost:7000/            # anonymous
//! ```

use std::sync::Arc;

use anyhow::Result;
use axum::{Json, Router, routing::get};
use password_hash::{PasswordHasher, SaltString, rand_core::OsRng};
use pbkdf2::Pbkdf2;
use portcullis::{
    Auth, AuthenticationLayer, AuthenticationPipeline, BasicAuthenticator, InMemoryProvider,
    PhcSecretVerifier, SimpleUser,
};
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

async fn whoami(Auth(auth): Auth) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "is_authenticated": auth.is_authenticated(),
        "id": auth.user_id(),
        "name": auth.display_name(),
        "method": auth.method().map(|m| m.as_str().to_string()),
    }))
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive("portcullis=debug".parse()?),
        )
        .init();

    // A real deployment stores the hash; the demo mints one at startup.
    info!("Hashing the demo password (pbkdf2, default strength)...");
    let salt = SaltString::generate(&mut OsRng);
    let hashed = Pbkdf2
        .hash_password("pa$$word".as_bytes(), &salt)
        .map_err(|e| anyhow::anyhow!("hashing failed: {}", e))?
        .to_string();

    let provider = Arc::new(
        InMemoryProvider::new()
            .with_user(SimpleUser::new("root@localhost", "Root").with_hashed_secret(hashed)),
    );
    let pipeline = AuthenticationPipeline::new(vec![Arc::new(BasicAuthenticator::new(
        provider,
        Arc::new(PhcSecretVerifier::new()),
    ))])?;

    let app = Router::new()
        .route("/", get(whoami))
        .route("/health", get(health))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive())
                .layer(AuthenticationLayer::new(pipeline)),
        );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:7000").await?;
    info!("Listening on http://127.0.0.1:7000");
    info!("Try: curl --user 'root@localhost:pa$$word' http://localhost:7000/");
    axum::serve(listener, app).await?;

    Ok(())
}
