//! API server configuration.

use axum_extra::extract::cookie::SameSite;

use kanri_core::auth::jwt::{resolve_access_secret, resolve_refresh_secret};

/// Configuration for the API server. Token secrets, expiry windows, and
/// cookie attributes are all injected here rather than hard-coded, since
/// cookie flags in particular must match the deployment (localhost vs
/// cross-origin production).
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// Address to bind the HTTP listener (e.g. "127.0.0.1:8000").
    pub bind_addr: String,
    /// PostgreSQL connection URL.
    pub database_url: String,
    /// Signing secret for access tokens.
    pub access_token_secret: String,
    /// Signing secret for refresh tokens. Must differ from the access
    /// secret so the two token kinds never verify against each other.
    pub refresh_token_secret: String,
    /// Access token lifetime in seconds.
    pub access_token_expiry_secs: i64,
    /// Refresh token lifetime in days.
    pub refresh_token_expiry_days: i64,
    /// `Secure` attribute on auth cookies.
    pub cookie_secure: bool,
    /// `SameSite` attribute on auth cookies.
    pub cookie_same_site: SameSite,
    /// Allowed CORS origin (the frontend).
    pub cors_origin: String,
}

impl ApiConfig {
    /// Reads configuration from environment variables with sensible defaults.
    ///
    /// | Variable                    | Default                                |
    /// |-----------------------------|----------------------------------------|
    /// | `BIND_ADDR`                 | `127.0.0.1:8000`                       |
    /// | `DATABASE_URL`              | `postgres://localhost:5432/kanri`      |
    /// | `ACCESS_TOKEN_SECRET`       | generated & persisted to file          |
    /// | `REFRESH_TOKEN_SECRET`      | generated & persisted to file          |
    /// | `ACCESS_TOKEN_EXPIRY_SECS`  | `900` (15 minutes)                     |
    /// | `REFRESH_TOKEN_EXPIRY_DAYS` | `30`                                   |
    /// | `COOKIE_SECURE`             | `false`                                |
    /// | `COOKIE_SAME_SITE`          | `lax` (`lax` \| `strict` \| `none`)    |
    /// | `CORS_ORIGIN`               | `http://localhost:5173`                |
    pub fn from_env() -> Self {
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8000".into()),
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost:5432/kanri".into()),
            access_token_secret: resolve_access_secret(),
            refresh_token_secret: resolve_refresh_secret(),
            access_token_expiry_secs: env_i64("ACCESS_TOKEN_EXPIRY_SECS", 900),
            refresh_token_expiry_days: env_i64("REFRESH_TOKEN_EXPIRY_DAYS", 30),
            cookie_secure: std::env::var("COOKIE_SECURE")
                .map(|v| v == "true" || v == "1")
                .unwrap_or(false),
            cookie_same_site: parse_same_site(
                std::env::var("COOKIE_SAME_SITE").as_deref().unwrap_or("lax"),
            ),
            cors_origin: std::env::var("CORS_ORIGIN")
                .unwrap_or_else(|_| "http://localhost:5173".into()),
        }
    }
}

fn env_i64(var: &str, default: i64) -> i64 {
    std::env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn parse_same_site(value: &str) -> SameSite {
    match value.to_ascii_lowercase().as_str() {
        "strict" => SameSite::Strict,
        "none" => SameSite::None,
        _ => SameSite::Lax,
    }
}
