use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, utoipa::ToSchema)]
#[sea_orm(table_name = "audit_logs")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    #[schema(value_type = String)]
    pub timestamp: DateTimeUtc,
    pub user_id: Option<i64>,
    pub action: String,
    pub resource_type: String,
    pub resource_id: Option<String>,
    pub details: Option<String>, // JSON string for flexible data
    pub success: bool,
    pub error_message: Option<String>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}

// Audit action types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum AuditAction {
    // Authentication
    Login,
    LoginFailed,

    // Invite link lifecycle
    InviteCreated,
    InviteRevoked,
    InviteRedeemed,
    InviteRejected,

    // Membership
    MemberJoined,
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuditAction::Login => write!(f, "login"),
            AuditAction::LoginFailed => write!(f, "login_failed"),
            AuditAction::InviteCreated => write!(f, "invite_created"),
            AuditAction::InviteRevoked => write!(f, "invite_revoked"),
            AuditAction::InviteRedeemed => write!(f, "invite_redeemed"),
            AuditAction::InviteRejected => write!(f, "invite_rejected"),
            AuditAction::MemberJoined => write!(f, "member_joined"),
        }
    }
}

// Resource types
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ResourceType {
    User,
    Workspace,
    Board,
    InviteLink,
}

impl std::fmt::Display for ResourceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResourceType::User => write!(f, "user"),
            ResourceType::Workspace => write!(f, "workspace"),
            ResourceType::Board => write!(f, "board"),
            ResourceType::InviteLink => write!(f, "invite_link"),
        }
    }
}
