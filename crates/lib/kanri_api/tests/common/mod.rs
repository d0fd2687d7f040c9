//! Shared helpers for integration tests.
//!
//! Tests run against a real PostgreSQL pointed to by `DATABASE_URL` and
//! skip (with a note on stderr) when it is unset, so the suite stays green
//! on machines without a database.

#![allow(dead_code)]

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use axum_extra::extract::cookie::SameSite;
use serde_json::Value;
use tower::ServiceExt;

use kanri_api::{AppState, config::ApiConfig};

pub fn test_config(database_url: String) -> ApiConfig {
    ApiConfig {
        bind_addr: "127.0.0.1:0".into(),
        database_url,
        access_token_secret: "test-access-secret".into(),
        refresh_token_secret: "test-refresh-secret".into(),
        access_token_expiry_secs: 900,
        refresh_token_expiry_days: 30,
        cookie_secure: false,
        cookie_same_site: SameSite::Lax,
        cors_origin: "http://localhost:5173".into(),
    }
}

/// Connect, migrate, and build state. `None` means no `DATABASE_URL`.
pub async fn test_state() -> Option<AppState> {
    let Ok(url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };
    let pool = sqlx::PgPool::connect(&url).await.expect("connect to PG");
    kanri_core::migrate::migrate(&pool).await.expect("migrate");
    Some(AppState {
        pool,
        config: test_config(url),
    })
}

/// Send one request through the router, returning status and parsed body.
pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let resp = app.clone().oneshot(req).await.expect("request");
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn post_json_auth(uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn patch_json_auth(uri: &str, body: Value, token: &str) -> Request<Body> {
    Request::builder()
        .method("PATCH")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::from(body.to_string()))
        .expect("request")
}

pub fn get_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

pub fn get_plain(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

pub fn delete_auth(uri: &str, token: &str) -> Request<Body> {
    Request::builder()
        .method("DELETE")
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .body(Body::empty())
        .expect("request")
}

/// A registered user with its issued token pair.
pub struct TestUser {
    pub id: String,
    pub access: String,
    pub refresh: String,
}

/// Register a fresh user with unique identity fields.
pub async fn register_user(app: &Router, prefix: &str) -> TestUser {
    let tag = uuid::Uuid::new_v4().simple().to_string();
    let tag = &tag[..12];
    let (status, body) = send(
        app,
        post_json(
            "/api/v1/auth/register",
            serde_json::json!({
                "name": format!("{prefix} {tag}"),
                "username": format!("{prefix}{tag}"),
                "email": format!("{prefix}{tag}@example.com"),
                "password": "Secret1!pass",
                "confirmPassword": "Secret1!pass",
            }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "register failed: {body}");
    TestUser {
        id: body["user"]["id"].as_str().expect("user id").to_string(),
        access: body["accessToken"].as_str().expect("accessToken").to_string(),
        refresh: body["refreshToken"]
            .as_str()
            .expect("refreshToken")
            .to_string(),
    }
}
