//! Authentication service: register/login/refresh/logout flows plus account
//! maintenance, delegating crypto and storage to `kanri_core::auth`.

use sqlx::PgPool;
use tracing::info;

use kanri_core::auth::{jwt, password, queries, validate};
use kanri_core::models::auth::User;

use crate::config::ApiConfig;
use crate::error::{AppError, AppResult};

/// Issue a fresh access+refresh pair for the user and persist the refresh
/// digest, overwriting any prior value. The overwrite is what invalidates
/// the previously outstanding refresh token.
pub async fn issue_token_pair(
    pool: &PgPool,
    config: &ApiConfig,
    user: &User,
) -> AppResult<(String, String)> {
    let access = jwt::generate_access_token(
        user,
        config.access_token_secret.as_bytes(),
        config.access_token_expiry_secs,
    )?;
    let refresh = jwt::generate_refresh_token(
        user,
        config.refresh_token_secret.as_bytes(),
        config.refresh_token_expiry_days,
    )?;
    queries::store_refresh_token(pool, &user.id, &jwt::hash_refresh_token(&refresh)).await?;
    Ok((access, refresh))
}

/// Register a new account and log it in.
pub async fn register(
    pool: &PgPool,
    config: &ApiConfig,
    name: &str,
    username: &str,
    email: &str,
    password_plain: &str,
    confirm_password: &str,
) -> AppResult<(User, String, String)> {
    let errors =
        validate::validate_registration(name, username, email, password_plain, confirm_password);
    if !errors.is_empty() {
        return Err(AppError::Validation(errors.join("; ")));
    }

    let username = username.to_lowercase();
    let email = email.to_lowercase();

    if queries::identity_taken(pool, name, &username, &email).await? {
        return Err(AppError::Validation("User already exists".into()));
    }

    let hash = password::hash_password(password_plain)?;
    let user = queries::create_user(pool, name, &username, &email, &hash).await?;
    info!(username = %user.username, "registered new user");

    let (access, refresh) = issue_token_pair(pool, config, &user).await?;
    Ok((user, access, refresh))
}

/// Authenticate with email or username plus password. The error is the same
/// for an unknown identifier and a wrong password.
pub async fn login(
    pool: &PgPool,
    config: &ApiConfig,
    email: Option<&str>,
    username: Option<&str>,
    password_plain: &str,
) -> AppResult<(User, String, String)> {
    let identifier = email
        .or(username)
        .map(|s| s.trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::Validation("Email or username is required".into()))?;

    let Some((user, hash)) = queries::find_auth_user_by_identifier(pool, &identifier).await? else {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    };
    if !password::verify_password(password_plain, &hash)? {
        return Err(AppError::Unauthorized("Invalid credentials".into()));
    }

    let (access, refresh) = issue_token_pair(pool, config, &user).await?;
    info!(username = %user.username, "user logged in");
    Ok((user, access, refresh))
}

/// Exchange a refresh token for a rotated pair.
///
/// The presented token must verify against the refresh secret AND match the
/// digest stored on the user record — a structurally valid token superseded
/// by a later login is rejected here regardless of its expiry.
pub async fn refresh(
    pool: &PgPool,
    config: &ApiConfig,
    presented: &str,
) -> AppResult<(String, String)> {
    let claims = jwt::verify_token(presented, config.refresh_token_secret.as_bytes())
        .map_err(|_| AppError::Forbidden("Invalid or expired refresh token".into()))?;

    let stored = queries::stored_refresh_hash(pool, &claims.sub).await?;
    let matches = matches!(&stored, Some(Some(h)) if *h == jwt::hash_refresh_token(presented));
    if !matches {
        return Err(AppError::Forbidden("Invalid or expired refresh token".into()));
    }

    let user = queries::find_user_by_id(pool, &claims.sub)
        .await?
        .ok_or_else(|| AppError::Forbidden("Invalid or expired refresh token".into()))?;

    issue_token_pair(pool, config, &user).await
}

/// Logout: clear the stored refresh-token hash so any outstanding refresh
/// token stops working, whatever its expiry.
pub async fn logout(pool: &PgPool, user_id: &str) -> AppResult<()> {
    queries::clear_refresh_token(pool, user_id).await?;
    info!(user_id, "user logged out");
    Ok(())
}

/// Change password after verifying the old one.
pub async fn change_password(
    pool: &PgPool,
    user_id: &str,
    old_password: &str,
    new_password: &str,
) -> AppResult<()> {
    let Some(hash) = queries::password_hash(pool, user_id).await? else {
        return Err(AppError::NotFound("User not found".into()));
    };
    if !password::verify_password(old_password, &hash)? {
        return Err(AppError::Validation("Incorrect old password".into()));
    }
    if !(8..=30).contains(&new_password.chars().count())
        || !validate::is_strong_password(new_password)
    {
        return Err(AppError::Validation(
            "Password must be 8-30 characters with uppercase, lowercase, number, and special character"
                .into(),
        ));
    }
    queries::update_password(pool, user_id, &password::hash_password(new_password)?).await?;
    Ok(())
}

/// Update name and/or email on the account.
pub async fn update_account(
    pool: &PgPool,
    user_id: &str,
    name: Option<&str>,
    email: Option<&str>,
) -> AppResult<User> {
    let email = email.map(|e| e.trim().to_lowercase());
    if let Some(e) = &email
        && !validate::is_valid_email(e)
    {
        return Err(AppError::Validation("Email is not valid".into()));
    }
    queries::update_account(pool, user_id, name, email.as_deref())
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".into()))
}

/// Delete the account. Board and task references cascade in the store.
pub async fn delete_account(pool: &PgPool, user_id: &str) -> AppResult<()> {
    if !queries::delete_user(pool, user_id).await? {
        return Err(AppError::NotFound("User not found".into()));
    }
    info!(user_id, "account deleted");
    Ok(())
}
