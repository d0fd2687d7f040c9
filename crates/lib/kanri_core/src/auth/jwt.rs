//! Token service: minting and verification of the two bearer-token kinds.
//!
//! Access and refresh tokens carry the same claim shape but are signed with
//! distinct secrets and expiry windows. Verification here is purely
//! cryptographic plus expiry; whether a refresh token matches the value
//! stored on the user record is the refresh flow's responsibility.

use std::path::PathBuf;

use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};
use sha2::{Digest, Sha256};
use tracing::info;

use super::AuthError;
use crate::models::auth::{TokenClaims, User};

/// Generate a signed access token (HS256).
pub fn generate_access_token(
    user: &User,
    secret: &[u8],
    expiry_secs: i64,
) -> Result<String, AuthError> {
    sign(user, secret, Duration::seconds(expiry_secs))
}

/// Generate a signed refresh token (HS256, distinct secret, longer expiry).
///
/// The caller must persist `hash_refresh_token` of the returned value on the
/// user record, overwriting any prior value — that overwrite is the rotation
/// point that invalidates the previous refresh token.
pub fn generate_refresh_token(
    user: &User,
    secret: &[u8],
    expiry_days: i64,
) -> Result<String, AuthError> {
    sign(user, secret, Duration::days(expiry_days))
}

fn sign(user: &User, secret: &[u8], ttl: Duration) -> Result<String, AuthError> {
    let now = Utc::now();
    let claims = TokenClaims {
        sub: user.id.clone(),
        username: user.username.clone(),
        email: user.email.clone(),
        name: user.name.clone(),
        role: user.role,
        exp: (now + ttl).timestamp(),
        iat: now.timestamp(),
        jti: random_token_id(),
    };
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Verify a token against the given secret, returning the claims.
///
/// Fails on bad signature or expiry; the error message carries the
/// underlying reason for diagnosability.
pub fn verify_token(token: &str, secret: &[u8]) -> Result<TokenClaims, AuthError> {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    decode::<TokenClaims>(token, &key, &validation)
        .map(|data| data.claims)
        .map_err(|e| AuthError::TokenError(format!("jwt decode: {e}")))
}

/// Random 16-char alphanumeric token id for the `jti` claim.
fn random_token_id() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(16)
        .map(char::from)
        .collect()
}

/// SHA-256 hex digest of a refresh token — the form stored on the user
/// record. The raw token never touches the database.
pub fn hash_refresh_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Resolve the access-token secret: env var `ACCESS_TOKEN_SECRET`, else a
/// generated secret persisted under the platform data dir.
pub fn resolve_access_secret() -> String {
    resolve_secret("ACCESS_TOKEN_SECRET", "access-token-secret")
}

/// Resolve the refresh-token secret: env var `REFRESH_TOKEN_SECRET`, else a
/// generated secret persisted under the platform data dir.
pub fn resolve_refresh_secret() -> String {
    resolve_secret("REFRESH_TOKEN_SECRET", "refresh-token-secret")
}

fn resolve_secret(env_var: &str, file_name: &str) -> String {
    if let Ok(secret) = std::env::var(env_var)
        && !secret.is_empty()
    {
        return secret;
    }
    let secret_path = secret_path(file_name);
    if let Ok(existing) = std::fs::read_to_string(&secret_path) {
        let trimmed = existing.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }
    let secret: String = rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect();
    if let Some(parent) = secret_path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    let _ = std::fs::write(&secret_path, &secret);
    info!(path = %secret_path.display(), "generated new token secret");
    secret
}

fn secret_path(file_name: &str) -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("kanri")
        .join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::auth::GlobalRole;

    fn test_user() -> User {
        User {
            id: "c2a8f5f0-1111-2222-3333-444455556666".to_string(),
            name: "Alice Example".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            role: GlobalRole::Member,
        }
    }

    #[test]
    fn access_token_round_trip() {
        let user = test_user();
        let token = generate_access_token(&user, b"access-secret", 900).expect("sign");
        let claims = verify_token(&token, b"access-secret").expect("verify");
        assert_eq!(claims.sub, user.id);
        assert_eq!(claims.username, "alice");
        assert_eq!(claims.email, "alice@example.com");
        assert_eq!(claims.role, GlobalRole::Member);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let token = generate_access_token(&test_user(), b"access-secret", 900).expect("sign");
        assert!(verify_token(&token, b"other-secret").is_err());
    }

    #[test]
    fn access_and_refresh_secrets_are_independent() {
        let user = test_user();
        let access = generate_access_token(&user, b"access-secret", 900).expect("sign");
        let refresh = generate_refresh_token(&user, b"refresh-secret", 30).expect("sign");
        // A token of one kind never verifies against the other kind's secret.
        assert!(verify_token(&access, b"refresh-secret").is_err());
        assert!(verify_token(&refresh, b"access-secret").is_err());
        assert!(verify_token(&refresh, b"refresh-secret").is_ok());
    }

    #[test]
    fn expired_token_is_rejected() {
        // Craft claims whose expiry is well past the default 60s leeway.
        let now = Utc::now();
        let claims = TokenClaims {
            sub: "some-user".to_string(),
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            name: "Alice Example".to_string(),
            role: GlobalRole::Member,
            exp: (now - Duration::hours(1)).timestamp(),
            iat: (now - Duration::hours(2)).timestamp(),
            jti: "0123456789abcdef".to_string(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"access-secret"),
        )
        .expect("encode");
        assert!(verify_token(&token, b"access-secret").is_err());
    }

    #[test]
    fn consecutive_refresh_tokens_differ() {
        // Rotation must always mint a distinct value, even within the same
        // second; the random jti guarantees it.
        let user = test_user();
        let a = generate_refresh_token(&user, b"refresh-secret", 30).expect("sign");
        let b = generate_refresh_token(&user, b"refresh-secret", 30).expect("sign");
        assert_ne!(a, b);
        assert_ne!(hash_refresh_token(&a), hash_refresh_token(&b));
    }

    #[test]
    fn refresh_token_hash_is_stable_and_token_specific() {
        let user = test_user();
        let a = generate_refresh_token(&user, b"refresh-secret", 30).expect("sign");
        assert_eq!(hash_refresh_token(&a), hash_refresh_token(&a));
        assert_ne!(hash_refresh_token(&a), hash_refresh_token("another-token"));
        assert_ne!(hash_refresh_token(&a), a);
    }
}
