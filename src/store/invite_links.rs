//! Persistence operations for invite links.
//!
//! Every function is generic over [`ConnectionTrait`] so the same operation
//! runs against the pooled connection or inside a transaction; the caller owns
//! the unit-of-work boundary. Quota consumption and status transitions never
//! go through load-mutate-save: they are single conditional UPDATE statements
//! whose predicate re-checks eligibility at commit time, so two redemptions
//! racing past the quota is impossible regardless of what either request read
//! beforehand. A conditional update that affects zero rows means "precondition
//! no longer holds", never "row missing" — callers re-read and reclassify.

use chrono::{DateTime, Utc};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, ConnectionTrait, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder,
};

use crate::error::Result;
use crate::models::invite_link::{self, Entity as InviteLink, ExpireReason, LinkStatus, LinkType};

pub async fn find_by_id<C: ConnectionTrait>(
    conn: &C,
    link_id: i64,
) -> Result<Option<invite_link::Model>> {
    Ok(InviteLink::find_by_id(link_id).one(conn).await?)
}

pub async fn find_by_token<C: ConnectionTrait>(
    conn: &C,
    token: &str,
) -> Result<Option<invite_link::Model>> {
    Ok(InviteLink::find()
        .filter(invite_link::Column::Token.eq(token))
        .one(conn)
        .await?)
}

pub async fn find_by_slug<C: ConnectionTrait>(
    conn: &C,
    slug: &str,
) -> Result<Option<invite_link::Model>> {
    Ok(InviteLink::find()
        .filter(invite_link::Column::Slug.eq(slug))
        .one(conn)
        .await?)
}

pub async fn token_exists<C: ConnectionTrait>(conn: &C, token: &str) -> Result<bool> {
    let count = InviteLink::find()
        .filter(invite_link::Column::Token.eq(token))
        .count(conn)
        .await?;
    Ok(count > 0)
}

pub async fn slug_exists<C: ConnectionTrait>(conn: &C, slug: &str) -> Result<bool> {
    let count = InviteLink::find()
        .filter(invite_link::Column::Slug.eq(slug))
        .count(conn)
        .await?;
    Ok(count > 0)
}

/// All links issued for one workspace or board, newest first.
pub async fn list_for_target<C: ConnectionTrait>(
    conn: &C,
    link_type: LinkType,
    target_id: i64,
) -> Result<Vec<invite_link::Model>> {
    Ok(InviteLink::find()
        .filter(invite_link::Column::LinkType.eq(link_type.as_str()))
        .filter(invite_link::Column::TargetId.eq(target_id))
        .order_by_desc(invite_link::Column::CreatedAt)
        .all(conn)
        .await?)
}

pub async fn insert<C: ConnectionTrait>(
    conn: &C,
    link: invite_link::ActiveModel,
) -> Result<invite_link::Model> {
    Ok(link.insert(conn).await?)
}

/// Atomically consume one use of an Active link.
///
/// The UPDATE increments `used_count` only while the link is still Active,
/// under quota, and not past its expiry at `now`; a second statement in the
/// same unit of work flips the link to Exhausted when the increment consumed
/// the final use. Returns `false` when the predicate did not hold — the caller
/// must re-read to find out why.
pub async fn try_increment_usage<C: ConnectionTrait>(
    conn: &C,
    link_id: i64,
    now: DateTime<Utc>,
) -> Result<bool> {
    let result = InviteLink::update_many()
        .col_expr(
            invite_link::Column::UsedCount,
            Expr::col(invite_link::Column::UsedCount).add(1),
        )
        .filter(invite_link::Column::Id.eq(link_id))
        .filter(invite_link::Column::Status.eq(LinkStatus::Active.as_str()))
        .filter(
            Expr::col(invite_link::Column::UsedCount).lt(Expr::col(invite_link::Column::MaxUses)),
        )
        .filter(
            Condition::any()
                .add(invite_link::Column::ExpiresAt.is_null())
                .add(invite_link::Column::ExpiresAt.gte(now)),
        )
        .exec(conn)
        .await?;

    if result.rows_affected == 0 {
        return Ok(false);
    }

    // The increment that consumed the final use also kills the link, in the
    // same unit of work as the increment itself.
    InviteLink::update_many()
        .col_expr(
            invite_link::Column::Status,
            Expr::value(LinkStatus::Exhausted.as_str()),
        )
        .col_expr(
            invite_link::Column::ExpireReason,
            Expr::value(ExpireReason::MaxUsesReached.as_str()),
        )
        .filter(invite_link::Column::Id.eq(link_id))
        .filter(invite_link::Column::Status.eq(LinkStatus::Active.as_str()))
        .filter(
            Expr::col(invite_link::Column::UsedCount).gte(Expr::col(invite_link::Column::MaxUses)),
        )
        .exec(conn)
        .await?;

    Ok(true)
}

/// Conditionally transition an Active link into a terminal status.
///
/// Used for revocation and for lazily flipping a time-expired link. Returns
/// `false` when the link was no longer Active; the recorded terminal reason of
/// whoever got there first is left untouched.
pub async fn try_mark_dead<C: ConnectionTrait>(
    conn: &C,
    link_id: i64,
    status: LinkStatus,
    reason: ExpireReason,
) -> Result<bool> {
    debug_assert!(status.is_terminal());

    let result = InviteLink::update_many()
        .col_expr(invite_link::Column::Status, Expr::value(status.as_str()))
        .col_expr(
            invite_link::Column::ExpireReason,
            Expr::value(reason.as_str()),
        )
        .filter(invite_link::Column::Id.eq(link_id))
        .filter(invite_link::Column::Status.eq(LinkStatus::Active.as_str()))
        .exec(conn)
        .await?;

    Ok(result.rows_affected > 0)
}
