//! Invite link entity and its lifecycle state machine.
//!
//! `Active` is the only initial state; `Revoked`, `Expired` and `Exhausted`
//! are terminal. Links are never deleted and never transition out of a
//! terminal state, so a dead token can never be replayed. The application
//! layer must not mutate rows directly; all transitions go through the
//! conditional updates in [`crate::store::invite_links`].

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "invite_links")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    pub link_type: String,
    pub target_id: i64,
    #[sea_orm(unique)]
    #[serde(skip_serializing)]
    pub token: String,
    #[sea_orm(unique)]
    pub slug: String,
    pub status: String,
    pub expire_reason: Option<String>,
    pub expires_at: Option<DateTimeUtc>,
    pub max_uses: i32,
    pub used_count: i32,
    pub invited_user_id: Option<i64>,
    pub created_at: DateTimeUtc,
    pub created_by: i64,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::CreatedBy",
        to = "super::user::Column::Id"
    )]
    CreatedBy,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CreatedBy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// What a link grants access to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkType {
    Workspace,
    Board,
}

impl LinkType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkType::Workspace => "workspace",
            LinkType::Board => "board",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "workspace" => Some(LinkType::Workspace),
            "board" => Some(LinkType::Board),
            _ => None,
        }
    }
}

impl std::fmt::Display for LinkType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum LinkStatus {
    Active,
    Revoked,
    Expired,
    Exhausted,
}

impl LinkStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LinkStatus::Active => "active",
            LinkStatus::Revoked => "revoked",
            LinkStatus::Expired => "expired",
            LinkStatus::Exhausted => "exhausted",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "active" => Some(LinkStatus::Active),
            "revoked" => Some(LinkStatus::Revoked),
            "expired" => Some(LinkStatus::Expired),
            "exhausted" => Some(LinkStatus::Exhausted),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, LinkStatus::Active)
    }
}

impl std::fmt::Display for LinkStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a link left the `Active` state. Set if and only if the status is
/// terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum ExpireReason {
    TimeExpired,
    MaxUsesReached,
    ManuallyRevoked,
}

impl ExpireReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExpireReason::TimeExpired => "time_expired",
            ExpireReason::MaxUsesReached => "max_uses_reached",
            ExpireReason::ManuallyRevoked => "manually_revoked",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "time_expired" => Some(ExpireReason::TimeExpired),
            "max_uses_reached" => Some(ExpireReason::MaxUsesReached),
            "manually_revoked" => Some(ExpireReason::ManuallyRevoked),
            _ => None,
        }
    }
}

impl std::fmt::Display for ExpireReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Model {
    pub fn status(&self) -> LinkStatus {
        LinkStatus::parse(&self.status).unwrap_or(LinkStatus::Revoked)
    }

    pub fn link_type(&self) -> Option<LinkType> {
        LinkType::parse(&self.link_type)
    }

    pub fn is_active(&self) -> bool {
        self.status() == LinkStatus::Active
    }

    /// Classify why a redemption of this link at `now` must be rejected, or
    /// `None` if the link is still redeemable.
    ///
    /// A terminal status wins over everything else; an Active link is then
    /// checked for time expiry before quota exhaustion, matching the order the
    /// store's conditional update evaluates its predicate.
    pub fn rejection_reason(&self, now: DateTime<Utc>) -> Option<ExpireReason> {
        match self.status() {
            LinkStatus::Active => {}
            LinkStatus::Revoked => {
                return Some(
                    self.expire_reason
                        .as_deref()
                        .and_then(ExpireReason::parse)
                        .unwrap_or(ExpireReason::ManuallyRevoked),
                )
            }
            LinkStatus::Expired => {
                return Some(
                    self.expire_reason
                        .as_deref()
                        .and_then(ExpireReason::parse)
                        .unwrap_or(ExpireReason::TimeExpired),
                )
            }
            LinkStatus::Exhausted => {
                return Some(
                    self.expire_reason
                        .as_deref()
                        .and_then(ExpireReason::parse)
                        .unwrap_or(ExpireReason::MaxUsesReached),
                )
            }
        }

        if let Some(expires_at) = self.expires_at {
            if now > expires_at {
                return Some(ExpireReason::TimeExpired);
            }
        }

        if self.used_count >= self.max_uses {
            return Some(ExpireReason::MaxUsesReached);
        }

        None
    }

    /// True when time-based expiry is the reason this link cannot be redeemed.
    pub fn is_time_expired(&self, now: DateTime<Utc>) -> bool {
        self.is_active()
            && self
                .expires_at
                .map(|expires_at| now > expires_at)
                .unwrap_or(false)
    }
}
