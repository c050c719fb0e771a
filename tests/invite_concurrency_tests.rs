//! Concurrent redemption: the quota must hold no matter how many requests
//! race on the same token.

mod common;

use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};

use boardhub::error::AppError;
use boardhub::models::invite_link::{ExpireReason, LinkStatus};
use boardhub::models::prelude::*;
use boardhub::models::workspace_member;
use boardhub::store::invite_links as link_store;

use common::*;

#[tokio::test]
async fn test_concurrent_redemptions_of_single_use_link() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let link = state
        .invites
        .create_link(&owner, workspace_link_params(ws.id))
        .await
        .unwrap();

    let mut contenders = Vec::new();
    for i in 0..8 {
        contenders.push(create_test_user(&state.db, &format!("contender{}", i)).await);
    }

    let mut handles = Vec::new();
    for contender in contenders {
        let state = state.clone();
        let token = link.token.clone();
        handles.push(tokio::spawn(async move {
            state.invites.redeem_link(&contender, &token).await
        }));
    }

    let mut successes = 0;
    let mut quota_rejections = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(outcome) => {
                successes += 1;
                assert_eq!(outcome.link.used_count, 1);
            }
            Err(AppError::LinkNotActive(ExpireReason::MaxUsesReached)) => quota_rejections += 1,
            Err(other) => panic!("unexpected redemption error: {}", other),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(quota_rejections, 7);

    let stored = link_store::find_by_id(&state.db, link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.used_count, 1);
    assert_eq!(stored.status(), LinkStatus::Exhausted);

    // Exactly the owner plus the one winner hold memberships.
    let members = WorkspaceMember::find()
        .filter(workspace_member::Column::WorkspaceId.eq(ws.id))
        .count(&state.db)
        .await
        .unwrap();
    assert_eq!(members, 2);
}

#[tokio::test]
async fn test_concurrent_redemptions_of_multi_use_link() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let mut params = workspace_link_params(ws.id);
    params.max_uses = Some(3);
    let link = state.invites.create_link(&owner, params).await.unwrap();

    let mut contenders = Vec::new();
    for i in 0..10 {
        contenders.push(create_test_user(&state.db, &format!("contender{}", i)).await);
    }

    let mut handles = Vec::new();
    for contender in contenders {
        let state = state.clone();
        let token = link.token.clone();
        handles.push(tokio::spawn(async move {
            state.invites.redeem_link(&contender, &token).await
        }));
    }

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::LinkNotActive(ExpireReason::MaxUsesReached)) => {}
            Err(other) => panic!("unexpected redemption error: {}", other),
        }
    }

    assert_eq!(successes, 3);

    let stored = link_store::find_by_id(&state.db, link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.used_count, 3);
    assert_eq!(stored.status(), LinkStatus::Exhausted);

    let members = WorkspaceMember::find()
        .filter(workspace_member::Column::WorkspaceId.eq(ws.id))
        .count(&state.db)
        .await
        .unwrap();
    assert_eq!(members, 4);
}

#[tokio::test]
async fn test_redeem_races_revoke_without_overshoot() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let mut params = workspace_link_params(ws.id);
    params.max_uses = Some(100);
    let link = state.invites.create_link(&owner, params).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..6 {
        let contender = create_test_user(&state.db, &format!("contender{}", i)).await;
        let state = state.clone();
        let token = link.token.clone();
        handles.push(tokio::spawn(async move {
            state.invites.redeem_link(&contender, &token).await
        }));
    }

    let revoker = {
        let state = state.clone();
        let owner = owner.clone();
        let link_id = link.id;
        tokio::spawn(async move { state.invites.revoke_link(&owner, link_id).await })
    };

    revoker.await.unwrap().unwrap();

    let mut successes = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(AppError::LinkNotActive(ExpireReason::ManuallyRevoked)) => {}
            Err(other) => panic!("unexpected redemption error: {}", other),
        }
    }

    // However the race resolves, the stored count matches the successes and
    // the link ends up Revoked.
    let stored = link_store::find_by_id(&state.db, link.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.used_count, successes);
    assert_eq!(stored.status(), LinkStatus::Revoked);
}
