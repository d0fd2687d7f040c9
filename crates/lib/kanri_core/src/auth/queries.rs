//! Credential-store queries.
//!
//! The user row is the sole server-side session record: `refresh_token_hash`
//! holds the SHA-256 of the single outstanding refresh token, and is
//! overwritten (never appended to) on login and refresh, and cleared on
//! logout.
//!
//! Identifier comparisons use `id::text = $1` rather than `$1::uuid` so a
//! malformed id coming from a token claim or path segment reads as "no such
//! row" instead of a cast error.

use sqlx::PgPool;

use super::AuthError;
use crate::models::auth::{GlobalRole, User};

type UserRow = (String, String, String, String, String);

const USER_COLUMNS: &str = "id::text, name, username, email, role::text";

fn user_from_row((id, name, username, email, role): UserRow) -> User {
    User {
        id,
        name,
        username,
        email,
        role: GlobalRole::from_db(&role),
    }
}

/// Fetch a sanitized user by id — no password hash, no refresh token.
pub async fn find_user_by_id(pool: &PgPool, user_id: &str) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE id::text = $1"
    ))
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

/// Fetch a user plus password hash by email or username (caller lowercases).
pub async fn find_auth_user_by_identifier(
    pool: &PgPool,
    identifier: &str,
) -> Result<Option<(User, String)>, AuthError> {
    let row = sqlx::query_as::<_, (String, String, String, String, String, String)>(&format!(
        "SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1 OR username = $1"
    ))
    .bind(identifier)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(|(id, name, username, email, role, hash)| {
        (user_from_row((id, name, username, email, role)), hash)
    }))
}

/// Whether a user with any of the given unique identity fields exists.
pub async fn identity_taken(
    pool: &PgPool,
    name: &str,
    username: &str,
    email: &str,
) -> Result<bool, AuthError> {
    let exists = sqlx::query_scalar::<_, bool>(
        "SELECT EXISTS(SELECT 1 FROM users WHERE name = $1 OR username = $2 OR email = $3)",
    )
    .bind(name)
    .bind(username)
    .bind(email)
    .fetch_one(pool)
    .await?;
    Ok(exists)
}

/// Create a new user, returning the sanitized record.
pub async fn create_user(
    pool: &PgPool,
    name: &str,
    username: &str,
    email: &str,
    password_hash: &str,
) -> Result<User, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "INSERT INTO users (name, username, email, password_hash) \
         VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
    ))
    .bind(name)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;
    Ok(user_from_row(row))
}

/// Overwrite the stored refresh-token hash. This is the rotation point:
/// whatever token was outstanding before is invalid afterwards.
pub async fn store_refresh_token(
    pool: &PgPool,
    user_id: &str,
    token_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET refresh_token_hash = $2, updated_at = now() WHERE id::text = $1")
        .bind(user_id)
        .bind(token_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Clear the stored refresh-token hash (logout). A previously issued
/// refresh token then fails the match check even before its expiry.
pub async fn clear_refresh_token(pool: &PgPool, user_id: &str) -> Result<(), AuthError> {
    sqlx::query(
        "UPDATE users SET refresh_token_hash = NULL, updated_at = now() WHERE id::text = $1",
    )
    .bind(user_id)
    .execute(pool)
    .await?;
    Ok(())
}

/// Fetch the stored refresh-token hash. Outer `None` means no such user;
/// inner `None` means logged out.
pub async fn stored_refresh_hash(
    pool: &PgPool,
    user_id: &str,
) -> Result<Option<Option<String>>, AuthError> {
    let row = sqlx::query_scalar::<_, Option<String>>(
        "SELECT refresh_token_hash FROM users WHERE id::text = $1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Fetch the password hash for a user.
pub async fn password_hash(pool: &PgPool, user_id: &str) -> Result<Option<String>, AuthError> {
    let row =
        sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE id::text = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;
    Ok(row)
}

/// Replace the password hash.
pub async fn update_password(
    pool: &PgPool,
    user_id: &str,
    password_hash: &str,
) -> Result<(), AuthError> {
    sqlx::query("UPDATE users SET password_hash = $2, updated_at = now() WHERE id::text = $1")
        .bind(user_id)
        .bind(password_hash)
        .execute(pool)
        .await?;
    Ok(())
}

/// Update name and/or email, returning the refreshed record.
pub async fn update_account(
    pool: &PgPool,
    user_id: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> Result<Option<User>, AuthError> {
    let row = sqlx::query_as::<_, UserRow>(&format!(
        "UPDATE users SET name = COALESCE($2, name), email = COALESCE($3, email), \
         updated_at = now() WHERE id::text = $1 RETURNING {USER_COLUMNS}"
    ))
    .bind(user_id)
    .bind(name)
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(row.map(user_from_row))
}

/// Delete a user account. Board/task references cascade at the schema level.
pub async fn delete_user(pool: &PgPool, user_id: &str) -> Result<bool, AuthError> {
    let result = sqlx::query("DELETE FROM users WHERE id::text = $1")
        .bind(user_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// List every user, sanitized.
pub async fn list_users(pool: &PgPool) -> Result<Vec<User>, AuthError> {
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users ORDER BY name"
    ))
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(user_from_row).collect())
}

/// Search users by name or email fragment, case-insensitively.
pub async fn search_users(pool: &PgPool, query: &str) -> Result<Vec<User>, AuthError> {
    let pattern = format!("%{query}%");
    let rows = sqlx::query_as::<_, UserRow>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE name ILIKE $1 OR email ILIKE $1 ORDER BY name"
    ))
    .bind(&pattern)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(user_from_row).collect())
}
