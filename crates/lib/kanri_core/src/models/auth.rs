//! User and token domain models.
//!
//! These are internal domain models; the wire DTOs (camelCase renames etc.)
//! live in `kanri_api`.

use serde::{Deserialize, Serialize};

/// Global user role, independent of any board-level role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GlobalRole {
    Admin,
    Member,
}

impl GlobalRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            GlobalRole::Admin => "admin",
            GlobalRole::Member => "member",
        }
    }

    /// Parse the database representation, defaulting to `member` for
    /// anything unexpected (the column is enum-constrained).
    pub fn from_db(s: &str) -> Self {
        match s {
            "admin" => GlobalRole::Admin,
            _ => GlobalRole::Member,
        }
    }
}

/// Sanitized user: no password hash, no refresh token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub username: String,
    pub email: String,
    pub role: GlobalRole,
}

/// JWT claims shared by access and refresh tokens. The two kinds differ
/// only in signing secret and expiry window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — user ID (standard JWT `sub` claim).
    pub sub: String,
    pub username: String,
    pub email: String,
    pub name: String,
    pub role: GlobalRole,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Random token id. Makes every minted token distinct, so rotating a
    /// refresh token always produces a new value even within one second.
    pub jti: String,
}
