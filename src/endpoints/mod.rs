pub mod auth;
pub mod invites;

use axum::{middleware, routing::get, Json, Router};

use crate::config::CONFIG;
use crate::middleware::require_auth;
use crate::state::AppState;

/// Build the application router.
///
/// Health, version, login and the slug preview are public; everything under
/// `/api/invites` requires a Bearer token.
pub fn create_router(state: AppState) -> Router {
    let public = Router::new()
        .route("/api/health", get(health_check))
        .route("/api/system/version", get(version))
        .route("/api/join/{slug}", get(invites::preview_invite))
        .nest("/auth", auth::router());

    let protected = Router::new()
        .nest("/api/invites", invites::router())
        .layer(middleware::from_fn_with_state(state.clone(), require_auth));

    public.merge(protected).with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}

async fn version() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "version": CONFIG.version }))
}
