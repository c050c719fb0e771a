//! Fire-and-forget notification sink for invite lifecycle events.
//!
//! Real-time consumers (websocket fan-out, activity feeds) subscribe to the
//! broadcast channel; publishing never fails an invite operation, even with
//! no subscribers attached.

use serde::Serialize;
use tokio::sync::broadcast;

use crate::models::invite_link::LinkType;

/// Broadcast channel carrying serialized invite events
pub type InviteEventBroadcast = broadcast::Sender<String>;

pub fn channel() -> InviteEventBroadcast {
    let (tx, _) = broadcast::channel(32);
    tx
}

#[derive(Debug, Clone, Serialize)]
pub struct InviteEvent {
    pub event: &'static str,
    pub link_id: i64,
    pub link_type: LinkType,
    pub target_id: i64,
    pub actor_id: i64,
}

impl InviteEvent {
    pub fn created(link_id: i64, link_type: LinkType, target_id: i64, actor_id: i64) -> Self {
        Self {
            event: "invite.created",
            link_id,
            link_type,
            target_id,
            actor_id,
        }
    }

    pub fn revoked(link_id: i64, link_type: LinkType, target_id: i64, actor_id: i64) -> Self {
        Self {
            event: "invite.revoked",
            link_id,
            link_type,
            target_id,
            actor_id,
        }
    }

    pub fn redeemed(link_id: i64, link_type: LinkType, target_id: i64, actor_id: i64) -> Self {
        Self {
            event: "invite.redeemed",
            link_id,
            link_type,
            target_id,
            actor_id,
        }
    }
}

/// Publish an event, dropping it if serialization fails or nobody listens.
pub fn publish(tx: &InviteEventBroadcast, event: &InviteEvent) {
    match serde_json::to_string(event) {
        Ok(json) => {
            // send only errors when there are no receivers
            let _ = tx.send(json);
        }
        Err(e) => {
            tracing::debug!("failed to serialize invite event: {}", e);
        }
    }
}
