//! Authentication logic: password hashing, token minting and verification,
//! registration validation, and the credential-store queries shared by the
//! HTTP layer.

pub mod jwt;
pub mod password;
pub mod queries;
pub mod validate;

use thiserror::Error;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid credentials")]
    CredentialError,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DbError(#[from] sqlx::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}
