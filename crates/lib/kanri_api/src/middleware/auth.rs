//! Session middleware: resolves each request to an authenticated user.
//!
//! The bearer value comes from the `accessToken` cookie, falling back to an
//! `Authorization: Bearer` header. Verification is followed by a principal
//! lookup, so a token for a deleted account never authenticates.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::cookie::CookieJar;

use kanri_core::auth::{jwt, queries};
use kanri_core::models::auth::User;

use crate::AppState;
use crate::error::AppError;
use crate::services::cookies::ACCESS_COOKIE;

/// The authenticated user, stored in request extensions for downstream
/// handlers. Request-scoped; never global.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

/// Axum middleware: extract the bearer token, verify it, load the user
/// (sans secrets), and inject [`CurrentUser`].
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let jar = CookieJar::from_headers(request.headers());
    let cookie_token = jar.get(ACCESS_COOKIE).map(|c| c.value().to_string());
    let header_token = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|v| v.to_string());

    let token = cookie_token
        .or(header_token)
        .ok_or_else(|| AppError::Unauthorized("No token provided".into()))?;

    let claims = jwt::verify_token(&token, state.config.access_token_secret.as_bytes())
        .map_err(|e| AppError::Unauthorized(format!("Invalid token: {e}")))?;

    let user = queries::find_user_by_id(&state.pool, &claims.sub)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::Unauthorized("Invalid token: user not found".into()))?;

    request.extensions_mut().insert(CurrentUser(user));

    Ok(next.run(request).await)
}
