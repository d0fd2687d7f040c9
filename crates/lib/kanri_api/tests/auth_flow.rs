//! Session lifecycle over real routes: register → login → me, refresh
//! rotation, and logout invalidation.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get_auth, post_json, register_user, send, test_state};

#[tokio::test]
async fn register_login_and_me_round_trip() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);

    let tag = uuid::Uuid::new_v4().simple().to_string();
    let tag = &tag[..12];
    let username = format!("alice{tag}");
    let email = format!("alice{tag}@example.com");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/register",
            json!({
                "name": format!("Alice {tag}"),
                "username": username,
                "email": email,
                "password": "Secret1!pass",
                "confirmPassword": "Secret1!pass",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert!(!body["accessToken"].as_str().unwrap_or("").is_empty());
    assert!(!body["refreshToken"].as_str().unwrap_or("").is_empty());

    // Login with the same credentials, by email.
    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/login",
            json!({ "email": email, "password": "Secret1!pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let access = body["accessToken"].as_str().expect("accessToken");

    // The profile comes back sanitized: no credential material.
    let (status, body) = send(&app, get_auth("/api/v1/auth/me", access)).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["user"]["username"], username.as_str());
    assert_eq!(body["user"]["email"], email.as_str());
    assert!(body["user"].get("password").is_none());
    assert!(body["user"].get("passwordHash").is_none());
    assert!(body["user"].get("refreshToken").is_none());
}

#[tokio::test]
async fn login_with_wrong_password_is_unauthorized() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let user = register_user(&app, "carol").await;

    // Look the username up via the profile to log in with it.
    let (_, body) = send(&app, get_auth("/api/v1/auth/me", &user.access)).await;
    let username = body["user"]["username"].as_str().expect("username");

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/login",
            json!({ "username": username, "password": "Wrong1!pass" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED, "{body}");
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn me_without_token_is_unauthorized() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);

    let (status, body) = send(&app, common::get_plain("/api/v1/auth/me")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
    assert_eq!(body["message"], "No token provided");
}

#[tokio::test]
async fn refresh_rotation_rejects_previous_token() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let user = register_user(&app, "dave").await;

    // First refresh succeeds and rotates.
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refreshToken": user.refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let rotated = body["refreshToken"].as_str().expect("refreshToken").to_string();
    assert_ne!(rotated, user.refresh);

    // The superseded token is rejected even though it has not expired.
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refreshToken": user.refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
    assert_eq!(body["error"], "forbidden");

    // The rotated token still works.
    let (status, _) = send(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refreshToken": rotated })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn logout_invalidates_outstanding_refresh_token() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);
    let user = register_user(&app, "erin").await;

    let (status, _) = send(
        &app,
        common::post_json_auth("/api/v1/auth/logout", json!({}), &user.access),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The refresh token is cryptographically fine but no longer stored.
    let (status, body) = send(
        &app,
        post_json("/api/v1/auth/refresh", json!({ "refreshToken": user.refresh })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN, "{body}");
}

#[tokio::test]
async fn registration_validation_collects_field_errors() {
    let Some(state) = test_state().await else {
        return;
    };
    let app = kanri_api::router(state);

    let (status, body) = send(
        &app,
        post_json(
            "/api/v1/auth/register",
            json!({
                "name": "Al",
                "username": "bob",
                "email": "not-an-email",
                "password": "weak",
                "confirmPassword": "other",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST, "{body}");
    assert_eq!(body["error"], "validation_error");
}
