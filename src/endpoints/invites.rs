//! HTTP surface of the invite link subsystem.
//!
//! Creation, listing and revocation are management endpoints gated by the
//! caller's role on the target. Redemption only needs an authenticated user
//! holding the token. The preview endpoint is public and secret-free.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{delete, get, post},
    Json, Router,
};
use validator::Validate;

use crate::error::{AppError, Result};
use crate::middleware::auth::Authenticated;
use crate::schemas::invite::{
    CreateInviteLinkRequest, InviteLinkResponse, JoinResponse, ListInvitesQuery, PreviewResponse,
    RedeemRequest,
};
use crate::services::CreateLinkParams;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_invites).post(create_invite))
        .route("/{link_id}", delete(revoke_invite))
        .route("/redeem", post(redeem_invite))
}

/// POST /api/invites
async fn create_invite(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(payload): Json<CreateInviteLinkRequest>,
) -> Result<(StatusCode, Json<InviteLinkResponse>)> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let link = state
        .invites
        .create_link(
            &actor,
            CreateLinkParams {
                link_type: payload.link_type,
                target_id: payload.target_id,
                expires_at: payload.expires_at,
                max_uses: payload.max_uses,
                invited_user_id: payload.invited_user_id,
                slug_hint: payload.slug_hint,
            },
        )
        .await?;

    Ok((StatusCode::CREATED, Json(InviteLinkResponse::with_token(link))))
}

/// GET /api/invites?link_type=...&target_id=...
async fn list_invites(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Query(query): Query<ListInvitesQuery>,
) -> Result<Json<Vec<InviteLinkResponse>>> {
    let links = state
        .invites
        .list_links(&actor, query.link_type, query.target_id)
        .await?;

    Ok(Json(links.into_iter().map(InviteLinkResponse::from).collect()))
}

/// DELETE /api/invites/{link_id}
async fn revoke_invite(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Path(link_id): Path<i64>,
) -> Result<Json<InviteLinkResponse>> {
    let link = state.invites.revoke_link(&actor, link_id).await?;
    Ok(Json(InviteLinkResponse::from(link)))
}

/// POST /api/invites/redeem
async fn redeem_invite(
    State(state): State<AppState>,
    Authenticated(actor): Authenticated,
    Json(payload): Json<RedeemRequest>,
) -> Result<Json<JoinResponse>> {
    let outcome = state.invites.redeem_link(&actor, &payload.token).await?;
    Ok(Json(JoinResponse::from(outcome)))
}

/// GET /api/join/{slug} (public)
pub async fn preview_invite(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<Json<PreviewResponse>> {
    let (link, target_name) = state.invites.preview(&slug).await?;

    Ok(Json(PreviewResponse {
        slug: link.slug,
        link_type: link.link_type,
        target_name,
    }))
}
