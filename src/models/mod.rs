pub mod audit_log;
pub mod board;
pub mod board_member;
pub mod invite_link;
pub mod user;
pub mod workspace;
pub mod workspace_member;

pub use workspace_member::MemberRole;

#[allow(unused_imports)]
pub mod prelude {
    pub use super::audit_log::{self, Entity as AuditLog};
    pub use super::board::{self, Entity as Board};
    pub use super::board_member::{self, Entity as BoardMember};
    pub use super::invite_link::{self, Entity as InviteLink};
    pub use super::user::{self, Entity as User};
    pub use super::workspace::{self, Entity as Workspace};
    pub use super::workspace_member::{self, Entity as WorkspaceMember};
}
