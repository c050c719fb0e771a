use axum::{extract::State, routing::post, Json, Router};
use sea_orm::{ColumnTrait, EntityTrait, QueryFilter};
use validator::Validate;

use crate::config::CONFIG;
use crate::error::{AppError, Result};
use crate::models::audit_log::{AuditAction, ResourceType};
use crate::models::prelude::*;
use crate::models::user;
use crate::schemas::auth::{LoginRequest, TokenResponse};
use crate::services::security::{create_access_token, verify_password};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/login", post(login))
}

/// Exchange username and password for a Bearer token.
async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<TokenResponse>> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let found = User::find()
        .filter(user::Column::Username.eq(&payload.username))
        .one(&state.db)
        .await?
        .filter(|u| u.is_active);

    let Some(user) = found else {
        log_failed_login(&state, &payload.username).await;
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    };

    if !verify_password(&payload.password, &user.hashed_password) {
        log_failed_login(&state, &payload.username).await;
        return Err(AppError::Unauthorized(
            "Invalid username or password".to_string(),
        ));
    }

    let access_token = create_access_token(user.id)?;

    if let Err(e) = state
        .audit
        .log_success(
            AuditAction::Login,
            ResourceType::User,
            Some(user.id.to_string()),
            Some(user.id),
            None,
        )
        .await
    {
        tracing::warn!("audit log write failed: {}", e);
    }

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".to_string(),
        expires_in: CONFIG.access_token_expire_secs,
    }))
}

async fn log_failed_login(state: &AppState, username: &str) {
    if let Err(e) = state
        .audit
        .log_failure(
            AuditAction::LoginFailed,
            ResourceType::User,
            None,
            None,
            Some(serde_json::json!({ "username": username })),
            "Invalid username or password",
        )
        .await
    {
        tracing::warn!("audit log write failed: {}", e);
    }
}
