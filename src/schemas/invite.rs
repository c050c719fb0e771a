//! Request and response schemas for the invite link API.
//!
//! The raw token only ever appears in the creation response. Every other
//! serialization of a link, including list and preview responses, omits it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::models::invite_link::{self, ExpireReason, LinkStatus, LinkType};
use crate::models::MemberRole;
use crate::services::invite::JoinOutcome;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateInviteLinkRequest {
    pub link_type: LinkType,
    pub target_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    #[validate(range(min = 1))]
    pub max_uses: Option<i32>,
    pub invited_user_id: Option<i64>,
    #[validate(length(max = 64))]
    pub slug_hint: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct RedeemRequest {
    pub token: String,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct ListInvitesQuery {
    pub link_type: LinkType,
    pub target_id: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct InviteLinkResponse {
    pub id: i64,
    pub link_type: String,
    pub target_id: i64,
    pub slug: String,
    pub status: LinkStatus,
    pub expire_reason: Option<ExpireReason>,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: i32,
    pub used_count: i32,
    pub invited_user_id: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub created_by: i64,
    /// Present only in the creation response.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

impl InviteLinkResponse {
    /// Creation response: the one place the secret token is handed out.
    pub fn with_token(link: invite_link::Model) -> Self {
        let token = link.token.clone();
        let mut response = Self::from(link);
        response.token = Some(token);
        response
    }
}

impl From<invite_link::Model> for InviteLinkResponse {
    fn from(link: invite_link::Model) -> Self {
        let status = link.status();
        let expire_reason = link.expire_reason.as_deref().and_then(ExpireReason::parse);

        Self {
            id: link.id,
            link_type: link.link_type,
            target_id: link.target_id,
            slug: link.slug,
            status,
            expire_reason,
            expires_at: link.expires_at,
            max_uses: link.max_uses,
            used_count: link.used_count,
            invited_user_id: link.invited_user_id,
            created_at: link.created_at,
            created_by: link.created_by,
            token: None,
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct JoinResponse {
    pub membership_id: i64,
    pub link_type: LinkType,
    pub target_id: i64,
    pub role: MemberRole,
    pub already_member: bool,
    pub link_status: LinkStatus,
    pub used_count: i32,
}

impl From<JoinOutcome> for JoinResponse {
    fn from(outcome: JoinOutcome) -> Self {
        let link_status = outcome.link.status();
        Self {
            membership_id: outcome.membership.membership_id,
            link_type: outcome.membership.link_type,
            target_id: outcome.membership.target_id,
            role: outcome.membership.role,
            already_member: outcome.membership.already_member,
            link_status,
            used_count: outcome.link.used_count,
        }
    }
}

/// Public landing-page view of a link: enough to render "join X", no secrets.
#[derive(Debug, Serialize, ToSchema)]
pub struct PreviewResponse {
    pub slug: String,
    pub link_type: String,
    pub target_name: String,
}
