use crate::db::DbConn;
use crate::services::{notifier, AuditService, InviteService};

/// Shared application state passed to all handlers
#[derive(Clone)]
pub struct AppState {
    pub db: DbConn,
    pub audit: AuditService,
    pub invites: InviteService,
    pub invite_events: notifier::InviteEventBroadcast,
}

impl AppState {
    pub fn new(db: DbConn) -> Self {
        let audit = AuditService::new(db.clone());
        let invite_events = notifier::channel();
        let invites = InviteService::new(db.clone(), audit.clone(), invite_events.clone());

        Self {
            db,
            audit,
            invites,
            invite_events,
        }
    }
}
