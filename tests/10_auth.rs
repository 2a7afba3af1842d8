mod common;

use axum::http::StatusCode;
use common::*;
use marketplace_api::auth::TokenService;
use std::sync::Arc;

#[tokio::test]
async fn test_missing_token() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/api/auth/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing");
    assert_eq!(body["error"], true);
}

#[tokio::test]
async fn test_header_without_bearer_prefix() {
    let (app, state) = test_app();
    let token = state.tokens.issue(ACTIVE_USER, 60).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token format");

    let (status, body) = send(&app, "GET", "/api/auth/me", Some("Basic abc")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Invalid token format");
}

#[tokio::test]
async fn test_token_signed_with_other_key() {
    let (app, _) = test_app();
    let other = TokenService::from_secret(
        b"not-the-server-key",
        3600,
        Arc::new(marketplace_api::auth::MemoryIdentityStore::default()),
    );
    let token = other.issue(ACTIVE_USER, 3600).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");

    let (status, body) = send(&app, "GET", "/api/auth/me", Some("Bearer not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn test_expired_token() {
    let (app, state) = test_app();
    let token = state.tokens.issue(ACTIVE_USER, 0).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}

#[tokio::test]
async fn test_me_returns_user_without_password_hash() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(ACTIVE_USER).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["id"], ACTIVE_USER);
    assert_eq!(body["user"]["username"], "user1");
    assert!(body["user"].get("password_hash").is_none());
}

#[tokio::test]
async fn test_logout_is_acknowledged() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(ACTIVE_USER).unwrap();

    let (status, body) = send(&app, "POST", "/api/auth/logout", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Logout successful");

    // Stateless tokens stay usable until they expire
    let (status, _) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_inactive_account() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(INACTIVE_USER).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User account is deactivated");
}

#[tokio::test]
async fn test_unknown_subject() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(999).unwrap();

    let (status, body) = send(&app, "GET", "/api/auth/me", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "User not found");
}

#[tokio::test]
async fn test_admin_routes_refuse_regular_users() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(ACTIVE_USER).unwrap();

    for (method, uri) in [
        ("GET", "/api/admin/dashboard"),
        ("GET", "/api/admin/users"),
        ("DELETE", "/api/admin/products/5"),
        ("POST", "/api/notifications/broadcast"),
    ] {
        let (status, body) = send(&app, method, uri, Some(&bearer(&token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN, "{} {}", method, uri);
        assert_eq!(body["message"], "Admin access required");
    }
}

#[tokio::test]
async fn test_admin_routes_authenticate_before_role_check() {
    let (app, _) = test_app();
    let (status, body) = send(&app, "GET", "/api/admin/dashboard", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is missing");
}

#[tokio::test]
async fn test_admin_passes_gate_and_reaches_database() {
    let (app, state) = test_app();
    let token = state.tokens.issue_default(ADMIN_USER).unwrap();

    // The pool points at a closed port, so the handler reports the outage
    let (status, body) = send(&app, "GET", "/api/admin/dashboard", Some(&bearer(&token))).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["code"], "SERVICE_UNAVAILABLE");
}
