use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::models::invite_link::ExpireReason;

/// Uniform user-facing rejection for any token that cannot be redeemed.
///
/// Unresolvable, revoked, expired and exhausted links all render this exact
/// message so the redemption endpoint cannot be used as a token-guessing
/// oracle. The distinguishing reason is logged server-side only.
pub const INVALID_LINK_DETAIL: &str = "Invite link is invalid or no longer active";

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invite token did not resolve to a redeemable link")]
    InvalidToken,

    #[error("Invite link is not active: {0}")]
    LinkNotActive(ExpireReason),

    #[error("Conflicting concurrent updates, retry budget exhausted")]
    TransientConflict,

    #[error("Service unavailable: {0}")]
    Unavailable(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(sea_orm::DbErr),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    #[error("Bcrypt error: {0}")]
    Bcrypt(#[from] bcrypt::BcryptError),
}

/// Pool acquisition timeouts surface as Unavailable, not as opaque 500s.
/// Every store call converts through here, whether or not it runs in a
/// transaction.
impl From<sea_orm::DbErr> for AppError {
    fn from(e: sea_orm::DbErr) -> Self {
        match e {
            sea_orm::DbErr::ConnectionAcquire(_) => {
                AppError::Unavailable("Store connection timed out".to_string())
            }
            other => AppError::Database(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.clone()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.clone()),
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            AppError::InvalidToken => (StatusCode::NOT_FOUND, INVALID_LINK_DETAIL.to_string()),
            AppError::LinkNotActive(reason) => {
                // Same body as InvalidToken; the reason stays in the logs.
                tracing::info!(reason = %reason, "invite redemption rejected");
                (StatusCode::NOT_FOUND, INVALID_LINK_DETAIL.to_string())
            }
            AppError::TransientConflict => (
                StatusCode::CONFLICT,
                "The invite link is busy, please retry".to_string(),
            ),
            AppError::Unavailable(msg) => (StatusCode::SERVICE_UNAVAILABLE, msg.clone()),
            AppError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg.clone()),
            AppError::Database(e) => {
                tracing::error!("Database error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Database error".to_string(),
                )
            }
            AppError::Json(e) => (StatusCode::BAD_REQUEST, format!("JSON error: {}", e)),
            AppError::Jwt(e) => (StatusCode::UNAUTHORIZED, format!("JWT error: {}", e)),
            AppError::Bcrypt(e) => {
                tracing::error!("Bcrypt error: {}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Authentication error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail: message })).into_response()
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::response::IntoResponse;
    use http_body_util::BodyExt;

    async fn get_response_body(response: Response) -> (StatusCode, String) {
        let status = response.status();
        let body = response.into_body();
        let bytes = body.collect().await.unwrap().to_bytes();
        let body_str = String::from_utf8(bytes.to_vec()).unwrap();
        (status, body_str)
    }

    #[tokio::test]
    async fn test_not_found_error() {
        let error = AppError::NotFound("Invite link not found".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Invite link not found"));
    }

    #[tokio::test]
    async fn test_validation_error() {
        let error = AppError::Validation("max_uses must be at least 1".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body.contains("max_uses must be at least 1"));
    }

    #[tokio::test]
    async fn test_forbidden_error() {
        let error = AppError::Forbidden("Editor role required".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert!(body.contains("Editor role required"));
    }

    #[tokio::test]
    async fn test_invalid_token_and_dead_link_are_indistinguishable() {
        let invalid = AppError::InvalidToken.into_response();
        let revoked = AppError::LinkNotActive(ExpireReason::ManuallyRevoked).into_response();
        let expired = AppError::LinkNotActive(ExpireReason::TimeExpired).into_response();

        let (s1, b1) = get_response_body(invalid).await;
        let (s2, b2) = get_response_body(revoked).await;
        let (s3, b3) = get_response_body(expired).await;

        assert_eq!(s1, StatusCode::NOT_FOUND);
        assert_eq!(s1, s2);
        assert_eq!(s2, s3);
        assert_eq!(b1, b2);
        assert_eq!(b2, b3);
        assert!(b1.contains(INVALID_LINK_DETAIL));
    }

    #[tokio::test]
    async fn test_transient_conflict_error() {
        let error = AppError::TransientConflict;
        let response = error.into_response();
        let (status, _) = get_response_body(response).await;

        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_unavailable_error() {
        let error = AppError::Unavailable("Store timed out".to_string());
        let response = error.into_response();
        let (status, body) = get_response_body(response).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(body.contains("Store timed out"));
    }

    #[tokio::test]
    async fn test_json_error_response_format() {
        let error = AppError::NotFound("Board not found".to_string());
        let response = error.into_response();
        let (_, body) = get_response_body(response).await;

        // Response should be JSON with "detail" field
        let parsed: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(parsed.get("detail").unwrap(), "Board not found");
    }

    #[test]
    fn test_error_display_impl() {
        assert_eq!(
            AppError::NotFound("test".to_string()).to_string(),
            "Not found: test"
        );
        assert_eq!(
            AppError::Validation("test".to_string()).to_string(),
            "Validation error: test"
        );
        assert_eq!(
            AppError::Forbidden("test".to_string()).to_string(),
            "Forbidden: test"
        );
        assert_eq!(
            AppError::Unavailable("test".to_string()).to_string(),
            "Service unavailable: test"
        );
    }

    #[test]
    fn test_connection_acquire_maps_to_unavailable() {
        let acquire: AppError =
            sea_orm::DbErr::ConnectionAcquire(sea_orm::ConnAcquireErr::Timeout).into();
        assert!(matches!(acquire, AppError::Unavailable(_)));

        let other: AppError = sea_orm::DbErr::Custom("boom".to_string()).into();
        assert!(matches!(other, AppError::Database(_)));
    }

    #[test]
    fn test_json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        assert!(json_err.is_err());
        let app_error: AppError = json_err.unwrap_err().into();
        assert!(matches!(app_error, AppError::Json(_)));
    }
}
