//! End-to-end HTTP tests for the invite API.

mod common;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use boardhub::models::MemberRole;

use common::*;

async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    bearer: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(bearer) = bearer {
        builder = builder.header(header::AUTHORIZATION, bearer);
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).to_string(),
        ))
    };
    (status, value)
}

#[tokio::test]
async fn test_health_and_version_are_public() {
    let state = setup_state().await;
    let app = build_app(state);

    let (status, body) = send(&app, "GET", "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, Value::String("OK".to_string()));

    let (status, body) = send(&app, "GET", "/api/system/version", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("version").is_some());
}

#[tokio::test]
async fn test_login_issues_usable_token() {
    let state = setup_state().await;
    let user = create_test_user(&state.db, "alice").await;
    let ws = create_workspace(&state.db, &user, "Acme").await;
    let app = build_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "password123" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["access_token"].as_str().unwrap().to_string();
    assert_eq!(body["token_type"], "bearer");

    let bearer = format!("Bearer {}", token);
    let (status, _) = send(
        &app,
        "GET",
        &format!("/api/invites?link_type=workspace&target_id={}", ws.id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_login_with_bad_password_fails() {
    let state = setup_state().await;
    create_test_user(&state.db, "alice").await;
    let app = build_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/auth/login",
        None,
        Some(json!({ "username": "alice", "password": "wrong" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["detail"].as_str().unwrap().contains("Invalid"));
}

#[tokio::test]
async fn test_invite_routes_require_auth() {
    let state = setup_state().await;
    let app = build_app(state);

    let (status, _) = send(&app, "GET", "/api/invites?link_type=workspace&target_id=1", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = send(
        &app,
        "POST",
        "/api/invites/redeem",
        None,
        Some(json!({ "token": "whatever" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_create_list_and_revoke_flow() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;
    let bearer = bearer_for(&owner);
    let app = build_app(state);

    let (status, created) = send(
        &app,
        "POST",
        "/api/invites",
        Some(&bearer),
        Some(json!({
            "link_type": "workspace",
            "target_id": ws.id,
            "max_uses": 5,
            "slug_hint": "Acme Crew"
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    // The secret appears exactly once, in the creation response.
    assert!(created["token"].as_str().unwrap().len() >= 43);
    assert_eq!(created["status"], "active");
    assert_eq!(created["max_uses"], 5);
    assert!(created["slug"].as_str().unwrap().starts_with("acme-crew-"));

    let (status, listed) = send(
        &app,
        "GET",
        &format!("/api/invites?link_type=workspace&target_id={}", ws.id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let listed = listed.as_array().unwrap();
    assert_eq!(listed.len(), 1);
    assert!(listed[0].get("token").is_none());

    let link_id = created["id"].as_i64().unwrap();
    let (status, revoked) = send(
        &app,
        "DELETE",
        &format!("/api/invites/{}", link_id),
        Some(&bearer),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(revoked["status"], "revoked");
    assert_eq!(revoked["expire_reason"], "manually_revoked");
}

#[tokio::test]
async fn test_redeem_endpoint_grants_membership() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let joiner = create_test_user(&state.db, "joiner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let link = state
        .invites
        .create_link(&owner, workspace_link_params(ws.id))
        .await
        .unwrap();

    let bearer = bearer_for(&joiner);
    let app = build_app(state);

    let (status, body) = send(
        &app,
        "POST",
        "/api/invites/redeem",
        Some(&bearer),
        Some(json!({ "token": link.token })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["link_type"], "workspace");
    assert_eq!(body["target_id"], ws.id);
    assert_eq!(body["role"], MemberRole::Editor.as_str());
    assert_eq!(body["already_member"], false);
    assert_eq!(body["used_count"], 1);
    assert_eq!(body["link_status"], "exhausted");
}

#[tokio::test]
async fn test_dead_and_unknown_tokens_get_identical_responses() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let joiner = create_test_user(&state.db, "joiner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let link = state
        .invites
        .create_link(&owner, workspace_link_params(ws.id))
        .await
        .unwrap();
    state.invites.revoke_link(&owner, link.id).await.unwrap();

    let bearer = bearer_for(&joiner);
    let app = build_app(state);

    let (unknown_status, unknown_body) = send(
        &app,
        "POST",
        "/api/invites/redeem",
        Some(&bearer),
        Some(json!({ "token": "no-such-token" })),
    )
    .await;

    let (revoked_status, revoked_body) = send(
        &app,
        "POST",
        "/api/invites/redeem",
        Some(&bearer),
        Some(json!({ "token": link.token })),
    )
    .await;

    // A guessed token and a revoked link are indistinguishable on the wire.
    assert_eq!(unknown_status, StatusCode::NOT_FOUND);
    assert_eq!(unknown_status, revoked_status);
    assert_eq!(unknown_body, revoked_body);
    assert_eq!(
        unknown_body["detail"],
        boardhub::error::INVALID_LINK_DETAIL
    );
}

#[tokio::test]
async fn test_preview_endpoint_is_public_and_secret_free() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;

    let link = state
        .invites
        .create_link(&owner, workspace_link_params(ws.id))
        .await
        .unwrap();

    let slug = link.slug.clone();
    let app = build_app(state);

    let (status, body) = send(&app, "GET", &format!("/api/join/{}", slug), None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["slug"], slug);
    assert_eq!(body["link_type"], "workspace");
    assert_eq!(body["target_name"], "Acme");
    assert!(body.get("token").is_none());

    let (status, _) = send(&app, "GET", "/api/join/not-a-slug", None, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_invite_validation_errors() {
    let state = setup_state().await;
    let owner = create_test_user(&state.db, "owner").await;
    let ws = create_workspace(&state.db, &owner, "Acme").await;
    let bearer = bearer_for(&owner);
    let app = build_app(state);

    let (status, _) = send(
        &app,
        "POST",
        "/api/invites",
        Some(&bearer),
        Some(json!({
            "link_type": "workspace",
            "target_id": ws.id,
            "max_uses": 0
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
