pub mod audit;
pub mod invite;
pub mod membership;
pub mod notifier;
pub mod policy;
pub mod security;
pub mod token;

pub use audit::AuditService;
pub use invite::{CreateLinkParams, InviteService, JoinOutcome};
pub use membership::{default_role_for, MembershipRef};
pub use notifier::{InviteEvent, InviteEventBroadcast};
pub use security::*;
