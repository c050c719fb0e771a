//! Shared helpers for integration tests.

#![allow(dead_code)]

use axum::Router;
use chrono::Utc;
use sea_orm::{ActiveModelTrait, ConnectOptions, Database, Set};
use sea_orm_migration::MigratorTrait;

use boardhub::db::DbConn;
use boardhub::endpoints::create_router;
use boardhub::migrations::Migrator;
use boardhub::models::invite_link::LinkType;
use boardhub::models::{board, board_member, user, workspace, workspace_member, MemberRole};
use boardhub::services::security::{create_access_token, hash_password};
use boardhub::services::{CreateLinkParams, InviteService};
use boardhub::state::AppState;

/// In-memory SQLite with the full schema applied.
///
/// A single pooled connection keeps every query on the same in-memory
/// database; sqlx would otherwise hand each connection its own.
pub async fn create_test_db() -> DbConn {
    let mut opts = ConnectOptions::new("sqlite::memory:");
    opts.max_connections(1).sqlx_logging(false);

    let db = Database::connect(opts).await.unwrap();
    Migrator::up(&db, None).await.unwrap();
    db
}

pub async fn setup_state() -> AppState {
    AppState::new(create_test_db().await)
}

pub fn build_app(state: AppState) -> Router {
    create_router(state)
}

pub async fn create_test_user(db: &DbConn, username: &str) -> user::Model {
    let now = Utc::now();
    user::ActiveModel {
        username: Set(username.to_string()),
        email: Set(format!("{}@example.com", username)),
        hashed_password: Set(hash_password("password123").unwrap()),
        is_active: Set(true),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

/// Workspace with `owner` as its Owner member.
pub async fn create_workspace(db: &DbConn, owner: &user::Model, name: &str) -> workspace::Model {
    let now = Utc::now();
    let ws = workspace::ActiveModel {
        name: Set(name.to_string()),
        created_by: Set(owner.id),
        archived_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();

    add_workspace_member(db, ws.id, owner.id, MemberRole::Owner).await;
    ws
}

pub async fn create_board(db: &DbConn, workspace_id: i64, owner: &user::Model) -> board::Model {
    let now = Utc::now();
    board::ActiveModel {
        workspace_id: Set(workspace_id),
        name: Set("Sprint board".to_string()),
        created_by: Set(owner.id),
        archived_at: Set(None),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
}

pub async fn add_workspace_member(db: &DbConn, workspace_id: i64, user_id: i64, role: MemberRole) {
    workspace_member::ActiveModel {
        workspace_id: Set(workspace_id),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub async fn add_board_member(db: &DbConn, board_id: i64, user_id: i64, role: MemberRole) {
    board_member::ActiveModel {
        board_id: Set(board_id),
        user_id: Set(user_id),
        role: Set(role.as_str().to_string()),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap();
}

pub fn bearer_for(user: &user::Model) -> String {
    format!("Bearer {}", create_access_token(user.id).unwrap())
}

/// Default params for a workspace invite; tests tweak fields as needed.
pub fn workspace_link_params(workspace_id: i64) -> CreateLinkParams {
    CreateLinkParams {
        link_type: LinkType::Workspace,
        target_id: workspace_id,
        expires_at: None,
        max_uses: None,
        invited_user_id: None,
        slug_hint: None,
    }
}

pub fn invites_of(state: &AppState) -> &InviteService {
    &state.invites
}
