//! Membership granting for successful invite redemptions.
//!
//! Grants run on the caller's connection so a redemption transaction covers
//! both the quota increment and the membership row. Granting is idempotent:
//! an existing membership is returned as-is, never duplicated and never
//! downgraded.

use chrono::Utc;
use sea_orm::{ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, Set};
use serde::Serialize;

use crate::error::Result;
use crate::models::invite_link::LinkType;
use crate::models::prelude::*;
use crate::models::{board_member, workspace_member, MemberRole};

/// Reference to the membership a redemption resolved to.
#[derive(Debug, Clone, Serialize)]
pub struct MembershipRef {
    pub membership_id: i64,
    pub link_type: LinkType,
    pub target_id: i64,
    pub role: MemberRole,
    pub already_member: bool,
}

/// The role granted to users joining through an invite link.
pub fn default_role_for(link_type: LinkType) -> MemberRole {
    match link_type {
        LinkType::Workspace => MemberRole::Editor,
        LinkType::Board => MemberRole::Editor,
    }
}

/// Add `user_id` to the target with `role`, or return the existing membership.
pub async fn grant<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    link_type: LinkType,
    target_id: i64,
    role: MemberRole,
) -> Result<MembershipRef> {
    match link_type {
        LinkType::Workspace => grant_workspace(conn, user_id, target_id, role).await,
        LinkType::Board => grant_board(conn, user_id, target_id, role).await,
    }
}

async fn grant_workspace<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    workspace_id: i64,
    role: MemberRole,
) -> Result<MembershipRef> {
    let existing = WorkspaceMember::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    if let Some(membership) = existing {
        let role = membership.role().unwrap_or(role);
        return Ok(MembershipRef {
            membership_id: membership.id,
            link_type: LinkType::Workspace,
            target_id: workspace_id,
            role,
            already_member: true,
        });
    }

    let membership = workspace_member::ActiveModel {
        workspace_id: Set(workspace_id),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(MembershipRef {
        membership_id: membership.id,
        link_type: LinkType::Workspace,
        target_id: workspace_id,
        role,
        already_member: false,
    })
}

async fn grant_board<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    board_id: i64,
    role: MemberRole,
) -> Result<MembershipRef> {
    let existing = BoardMember::find()
        .filter(board_member::Column::BoardId.eq(board_id))
        .filter(board_member::Column::UserId.eq(user_id))
        .one(conn)
        .await?;

    if let Some(membership) = existing {
        let role = membership.role().unwrap_or(role);
        return Ok(MembershipRef {
            membership_id: membership.id,
            link_type: LinkType::Board,
            target_id: board_id,
            role,
            already_member: true,
        });
    }

    let membership = board_member::ActiveModel {
        board_id: Set(board_id),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(conn)
    .await?;

    Ok(MembershipRef {
        membership_id: membership.id,
        link_type: LinkType::Board,
        target_id: board_id,
        role,
        already_member: false,
    })
}
