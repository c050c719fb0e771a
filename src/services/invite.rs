//! Invite link lifecycle orchestration: creation, revocation, redemption.
//!
//! The service never mutates a link by load-mutate-save. Every transition
//! runs as a conditional update in [`crate::store::invite_links`], and a
//! redemption couples the quota increment with the membership grant in one
//! transaction. `used_count` is read fresh from the store on every request;
//! nothing about a link is cached in process.

use chrono::{DateTime, Utc};
use sea_orm::{EntityTrait, Set, TransactionTrait};
use std::time::Duration;

use crate::config::CONFIG;
use crate::db::DbConn;
use crate::error::{AppError, Result};
use crate::models::audit_log::{AuditAction, ResourceType};
use crate::models::invite_link::{self, ExpireReason, LinkStatus, LinkType};
use crate::models::prelude::*;
use crate::models::user;
use crate::services::audit::AuditService;
use crate::services::membership::{self, default_role_for, MembershipRef};
use crate::services::notifier::{self, InviteEvent, InviteEventBroadcast};
use crate::services::policy::{self, Action, Resource};
use crate::services::token;
use crate::store::invite_links as link_store;

#[derive(Debug, Clone)]
pub struct CreateLinkParams {
    pub link_type: LinkType,
    pub target_id: i64,
    pub expires_at: Option<DateTime<Utc>>,
    pub max_uses: Option<i32>,
    pub invited_user_id: Option<i64>,
    pub slug_hint: Option<String>,
}

/// Result of a successful redemption.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    pub link: invite_link::Model,
    pub membership: MembershipRef,
}

#[derive(Clone)]
pub struct InviteService {
    db: DbConn,
    audit: AuditService,
    events: InviteEventBroadcast,
}

impl InviteService {
    pub fn new(db: DbConn, audit: AuditService, events: InviteEventBroadcast) -> Self {
        Self { db, audit, events }
    }

    /// Issue a new invite link for a workspace or board.
    pub async fn create_link(
        &self,
        actor: &user::Model,
        params: CreateLinkParams,
    ) -> Result<invite_link::Model> {
        let max_uses = params.max_uses.unwrap_or(CONFIG.default_max_uses);
        if max_uses < 1 {
            return Err(AppError::Validation(
                "max_uses must be at least 1".to_string(),
            ));
        }

        let now = Utc::now();
        if let Some(expires_at) = params.expires_at {
            if expires_at <= now {
                return Err(AppError::Validation(
                    "expires_at must be in the future".to_string(),
                ));
            }
        }

        let resource = Resource::for_link_target(params.link_type, params.target_id);
        policy::authorize(&self.db, actor.id, resource, Action::CreateInvite).await?;

        if self
            .live_target_name(params.link_type, params.target_id)
            .await?
            .is_none()
        {
            return Err(AppError::NotFound(
                "Invite target not found or archived".to_string(),
            ));
        }

        if let Some(invited_user_id) = params.invited_user_id {
            if User::find_by_id(invited_user_id)
                .one(&self.db)
                .await?
                .is_none()
            {
                return Err(AppError::Validation(
                    "Invited user does not exist".to_string(),
                ));
            }
        }

        let token = token::unique_token(&self.db, token::generate_token).await?;
        let slug = token::unique_slug(&self.db, || {
            token::generate_slug(params.slug_hint.as_deref())
        })
        .await?;

        let link = link_store::insert(
            &self.db,
            invite_link::ActiveModel {
                link_type: Set(params.link_type.as_str().to_string()),
                target_id: Set(params.target_id),
                token: Set(token),
                slug: Set(slug),
                status: Set(LinkStatus::Active.as_str().to_string()),
                expire_reason: Set(None),
                expires_at: Set(params.expires_at),
                max_uses: Set(max_uses),
                used_count: Set(0),
                invited_user_id: Set(params.invited_user_id),
                created_at: Set(now),
                created_by: Set(actor.id),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(link_id = link.id, slug = %link.slug, "invite link created");
        self.audit_success(
            AuditAction::InviteCreated,
            &link,
            actor.id,
            serde_json::json!({
                "link_type": link.link_type,
                "target_id": link.target_id,
                "max_uses": link.max_uses,
                "slug": link.slug,
            }),
        )
        .await;
        notifier::publish(
            &self.events,
            &InviteEvent::created(link.id, params.link_type, params.target_id, actor.id),
        );

        Ok(link)
    }

    /// Revoke a link. Idempotent: a link that already left Active is returned
    /// unchanged, keeping whatever terminal reason it died with.
    pub async fn revoke_link(
        &self,
        actor: &user::Model,
        link_id: i64,
    ) -> Result<invite_link::Model> {
        let Some(link) = link_store::find_by_id(&self.db, link_id).await? else {
            return Err(AppError::NotFound("Invite link not found".to_string()));
        };

        // The creator may always revoke their own link; anyone else needs an
        // owner role on the target.
        if link.created_by != actor.id {
            let resource = Resource::for_link(&link).ok_or_else(|| {
                AppError::Internal(format!("invite link {} has a malformed type", link.id))
            })?;
            policy::authorize(&self.db, actor.id, resource, Action::RevokeInvite).await?;
        }

        if !link.is_active() {
            return Ok(link);
        }

        let flipped = link_store::try_mark_dead(
            &self.db,
            link.id,
            LinkStatus::Revoked,
            ExpireReason::ManuallyRevoked,
        )
        .await?;
        if !flipped {
            // Lost a race against another revoke or a quota/time expiry;
            // either way the link is dead, which is what was asked for.
            tracing::debug!(link_id = link.id, "link left Active before revocation landed");
        }

        let link = link_store::find_by_id(&self.db, link_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("Invite link vanished during revocation".to_string())
            })?;

        if flipped {
            tracing::info!(link_id = link.id, "invite link revoked");
            self.audit_success(
                AuditAction::InviteRevoked,
                &link,
                actor.id,
                serde_json::json!({ "slug": link.slug }),
            )
            .await;
            if let Some(link_type) = link.link_type() {
                notifier::publish(
                    &self.events,
                    &InviteEvent::revoked(link.id, link_type, link.target_id, actor.id),
                );
            }
        }

        Ok(link)
    }

    /// Redeem a token on behalf of `actor`, granting membership on success.
    pub async fn redeem_link(&self, actor: &user::Model, raw_token: &str) -> Result<JoinOutcome> {
        let Some(link) = link_store::find_by_token(&self.db, raw_token).await? else {
            tracing::info!(actor_id = actor.id, "redemption with unresolvable token");
            self.audit_rejection(None, actor.id, "unknown token").await;
            return Err(AppError::InvalidToken);
        };

        let link_type = link.link_type().ok_or_else(|| {
            AppError::Internal(format!("invite link {} has a malformed type", link.id))
        })?;

        if let Some(invited_user_id) = link.invited_user_id {
            if invited_user_id != actor.id {
                self.audit_rejection(Some(&link), actor.id, "not the designated invitee")
                    .await;
                return Err(AppError::Forbidden(
                    "This invite link is reserved for a different user".to_string(),
                ));
            }
        }

        // A link whose target vanished or was archived is dead; outsiders
        // cannot tell it from a bad token.
        if self
            .live_target_name(link_type, link.target_id)
            .await?
            .is_none()
        {
            tracing::info!(link_id = link.id, "redemption against missing or archived target");
            self.audit_rejection(Some(&link), actor.id, "target missing or archived")
                .await;
            return Err(AppError::InvalidToken);
        }

        let role = default_role_for(link_type);
        let mut attempt: u32 = 0;

        loop {
            attempt += 1;
            let now = Utc::now();

            match self
                .try_redeem_once(link.id, actor.id, link_type, link.target_id, role, now)
                .await
            {
                Ok(Some(outcome)) => {
                    tracing::info!(
                        link_id = outcome.link.id,
                        actor_id = actor.id,
                        used_count = outcome.link.used_count,
                        status = %outcome.link.status,
                        "invite link redeemed"
                    );
                    self.audit_success(
                        AuditAction::InviteRedeemed,
                        &outcome.link,
                        actor.id,
                        serde_json::json!({
                            "membership_id": outcome.membership.membership_id,
                            "already_member": outcome.membership.already_member,
                        }),
                    )
                    .await;
                    notifier::publish(
                        &self.events,
                        &InviteEvent::redeemed(
                            outcome.link.id,
                            link_type,
                            outcome.link.target_id,
                            actor.id,
                        ),
                    );
                    return Ok(outcome);
                }
                Ok(None) => match self.classify_rejection(link.id, now).await? {
                    Some(error) => {
                        if let AppError::LinkNotActive(reason) = &error {
                            tracing::info!(
                                link_id = link.id,
                                actor_id = actor.id,
                                reason = %reason,
                                "redemption rejected"
                            );
                            self.audit_rejection(Some(&link), actor.id, reason.as_str())
                                .await;
                        }
                        return Err(error);
                    }
                    // The link still looks redeemable; the conditional update
                    // lost a race that then went nowhere. Retry, bounded.
                    None if attempt <= CONFIG.redeem_retry_limit => {
                        tracing::warn!(link_id = link.id, attempt, "redemption contended, retrying");
                        tokio::time::sleep(Duration::from_millis(20 * u64::from(attempt))).await;
                    }
                    None => return Err(AppError::TransientConflict),
                },
                Err(e @ (AppError::Database(_) | AppError::Unavailable(_)))
                    if attempt <= CONFIG.redeem_retry_limit =>
                {
                    tracing::warn!(
                        link_id = link.id,
                        attempt,
                        "store error during redemption, retrying: {}",
                        e
                    );
                    tokio::time::sleep(Duration::from_millis(20 * u64::from(attempt))).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// Policy-guarded listing of all links issued for a target.
    pub async fn list_links(
        &self,
        actor: &user::Model,
        link_type: LinkType,
        target_id: i64,
    ) -> Result<Vec<invite_link::Model>> {
        let resource = Resource::for_link_target(link_type, target_id);
        policy::authorize(&self.db, actor.id, resource, Action::ListInvites).await?;
        link_store::list_for_target(&self.db, link_type, target_id).await
    }

    /// Public, non-secret lookup by slug for the invite landing page.
    ///
    /// Dead, unknown and orphaned slugs are all rejected identically.
    pub async fn preview(&self, slug: &str) -> Result<(invite_link::Model, String)> {
        let Some(link) = link_store::find_by_slug(&self.db, slug).await? else {
            return Err(AppError::InvalidToken);
        };

        if link.rejection_reason(Utc::now()).is_some() {
            return Err(AppError::InvalidToken);
        }

        let link_type = link.link_type().ok_or_else(|| {
            AppError::Internal(format!("invite link {} has a malformed type", link.id))
        })?;

        let Some(target_name) = self.live_target_name(link_type, link.target_id).await? else {
            return Err(AppError::InvalidToken);
        };

        Ok((link, target_name))
    }

    /// One redemption attempt: conditional increment plus membership grant in
    /// a single transaction. `None` means the increment's predicate no longer
    /// held and nothing was changed.
    async fn try_redeem_once(
        &self,
        link_id: i64,
        user_id: i64,
        link_type: LinkType,
        target_id: i64,
        role: crate::models::MemberRole,
        now: DateTime<Utc>,
    ) -> Result<Option<JoinOutcome>> {
        let txn = self.db.begin().await.map_err(AppError::from)?;

        if !link_store::try_increment_usage(&txn, link_id, now).await? {
            txn.rollback().await.map_err(AppError::from)?;
            return Ok(None);
        }

        let membership = membership::grant(&txn, user_id, link_type, target_id, role).await?;
        txn.commit().await.map_err(AppError::from)?;

        let link = link_store::find_by_id(&self.db, link_id)
            .await?
            .ok_or_else(|| {
                AppError::Internal("Invite link vanished during redemption".to_string())
            })?;

        Ok(Some(JoinOutcome { link, membership }))
    }

    /// Find out why the conditional increment declined, re-reading current
    /// state. `None` means the link looks redeemable again (pure contention).
    async fn classify_rejection(
        &self,
        link_id: i64,
        now: DateTime<Utc>,
    ) -> Result<Option<AppError>> {
        let Some(current) = link_store::find_by_id(&self.db, link_id).await? else {
            // Links are never deleted; treat a missing row like a bad token.
            return Ok(Some(AppError::InvalidToken));
        };

        // Lazy flip: the rejected attempt is what moves a time-expired link
        // into its terminal state.
        if current.is_time_expired(now) {
            link_store::try_mark_dead(
                &self.db,
                link_id,
                LinkStatus::Expired,
                ExpireReason::TimeExpired,
            )
            .await?;
            return Ok(Some(AppError::LinkNotActive(ExpireReason::TimeExpired)));
        }

        match current.rejection_reason(now) {
            // An Active link at quota gets the same lazy treatment.
            Some(ExpireReason::MaxUsesReached) if current.is_active() => {
                link_store::try_mark_dead(
                    &self.db,
                    link_id,
                    LinkStatus::Exhausted,
                    ExpireReason::MaxUsesReached,
                )
                .await?;
                Ok(Some(AppError::LinkNotActive(ExpireReason::MaxUsesReached)))
            }
            Some(reason) => Ok(Some(AppError::LinkNotActive(reason))),
            None => Ok(None),
        }
    }

    /// Target name when the workspace/board exists and is not archived.
    async fn live_target_name(
        &self,
        link_type: LinkType,
        target_id: i64,
    ) -> Result<Option<String>> {
        match link_type {
            LinkType::Workspace => Ok(Workspace::find_by_id(target_id)
                .one(&self.db)
                .await?
                .filter(|w| !w.is_archived())
                .map(|w| w.name)),
            LinkType::Board => Ok(Board::find_by_id(target_id)
                .one(&self.db)
                .await?
                .filter(|b| !b.is_archived())
                .map(|b| b.name)),
        }
    }

    async fn audit_success(
        &self,
        action: AuditAction,
        link: &invite_link::Model,
        actor_id: i64,
        details: serde_json::Value,
    ) {
        if let Err(e) = self
            .audit
            .log_success(
                action,
                ResourceType::InviteLink,
                Some(link.id.to_string()),
                Some(actor_id),
                Some(details),
            )
            .await
        {
            tracing::warn!("audit log write failed: {}", e);
        }
    }

    async fn audit_rejection(
        &self,
        link: Option<&invite_link::Model>,
        actor_id: i64,
        reason: &str,
    ) {
        if let Err(e) = self
            .audit
            .log_failure(
                AuditAction::InviteRejected,
                ResourceType::InviteLink,
                link.map(|l| l.id.to_string()),
                Some(actor_id),
                None,
                reason,
            )
            .await
        {
            tracing::warn!("audit log write failed: {}", e);
        }
    }
}
