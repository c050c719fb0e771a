//! Central policy evaluation for invite management.
//!
//! One function answers "may this actor perform this action on this
//! resource?" with an allow/deny decision carrying a reason, so the rules are
//! unit-testable in one place instead of scattered through handlers.
//!
//! A board inherits memberships from its parent workspace: when the actor has
//! no explicit board membership, their workspace role applies.

use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::error::{AppError, Result};
use crate::models::invite_link::{self, LinkType};
use crate::models::prelude::*;
use crate::models::{board_member, workspace_member, MemberRole};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Workspace(i64),
    Board(i64),
}

impl Resource {
    pub fn for_link_target(link_type: LinkType, target_id: i64) -> Self {
        match link_type {
            LinkType::Workspace => Resource::Workspace(target_id),
            LinkType::Board => Resource::Board(target_id),
        }
    }

    pub fn for_link(link: &invite_link::Model) -> Option<Self> {
        link.link_type()
            .map(|link_type| Self::for_link_target(link_type, link.target_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    CreateInvite,
    ListInvites,
    RevokeInvite,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(&'static str),
}

/// Evaluate whether `actor_id` may perform `action` on `resource`.
pub async fn evaluate<C: ConnectionTrait>(
    conn: &C,
    actor_id: i64,
    resource: Resource,
    action: Action,
) -> Result<Decision> {
    let role = member_role(conn, actor_id, resource).await?;

    let decision = match (action, role) {
        (_, None) => Decision::Deny("Not a member of the target"),
        (Action::CreateInvite | Action::ListInvites, Some(role)) => {
            if role.can_manage_invites() {
                Decision::Allow
            } else {
                Decision::Deny("Owner or editor role required")
            }
        }
        (Action::RevokeInvite, Some(role)) => {
            if role == MemberRole::Owner {
                Decision::Allow
            } else {
                Decision::Deny("Owner role required")
            }
        }
    };

    Ok(decision)
}

/// Like [`evaluate`], but turns a denial into `AppError::Forbidden`.
pub async fn authorize<C: ConnectionTrait>(
    conn: &C,
    actor_id: i64,
    resource: Resource,
    action: Action,
) -> Result<()> {
    match evaluate(conn, actor_id, resource, action).await? {
        Decision::Allow => Ok(()),
        Decision::Deny(reason) => Err(AppError::Forbidden(reason.to_string())),
    }
}

/// The actor's effective role on a resource, if any.
pub async fn member_role<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    resource: Resource,
) -> Result<Option<MemberRole>> {
    match resource {
        Resource::Workspace(workspace_id) => workspace_role(conn, user_id, workspace_id).await,
        Resource::Board(board_id) => {
            let membership = BoardMember::find()
                .filter(board_member::Column::BoardId.eq(board_id))
                .filter(board_member::Column::UserId.eq(user_id))
                .one(conn)
                .await?;
            if let Some(membership) = membership {
                return Ok(membership.role());
            }

            // No explicit board membership; fall back to the parent workspace.
            let Some(board) = Board::find_by_id(board_id).one(conn).await? else {
                return Ok(None);
            };
            workspace_role(conn, user_id, board.workspace_id).await
        }
    }
}

async fn workspace_role<C: ConnectionTrait>(
    conn: &C,
    user_id: i64,
    workspace_id: i64,
) -> Result<Option<MemberRole>> {
    let membership = WorkspaceMember::find()
        .filter(workspace_member::Column::WorkspaceId.eq(workspace_id))
        .filter(workspace_member::Column::UserId.eq(user_id))
        .one(conn)
        .await?;
    Ok(membership.and_then(|m| m.role()))
}
