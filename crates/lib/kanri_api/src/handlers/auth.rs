//! Authentication and account request handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use axum_extra::extract::cookie::CookieJar;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{
    AuthResponse, ChangePasswordRequest, LoginRequest, MessageResponse, RefreshRequest,
    RegisterRequest, TokenPairResponse, UpdateAccountRequest, UserResponse,
};
use crate::services::{auth, cookies};

/// `POST /auth/register` — create an account and log it in.
pub async fn register_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, access, refresh) = auth::register(
        &state.pool,
        &state.config,
        &body.name,
        &body.username,
        &body.email,
        &body.password,
        &body.confirm_password,
    )
    .await?;
    let jar = jar
        .add(cookies::access_cookie(&access, &state.config))
        .add(cookies::refresh_cookie(&refresh, &state.config));
    Ok((
        StatusCode::CREATED,
        jar,
        Json(AuthResponse {
            user: user.into(),
            access_token: access,
            refresh_token: refresh,
        }),
    ))
}

/// `POST /auth/login` — authenticate with email or username plus password.
pub async fn login_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    let (user, access, refresh) = auth::login(
        &state.pool,
        &state.config,
        body.email.as_deref(),
        body.username.as_deref(),
        &body.password,
    )
    .await?;
    let jar = jar
        .add(cookies::access_cookie(&access, &state.config))
        .add(cookies::refresh_cookie(&refresh, &state.config));
    Ok((
        jar,
        Json(AuthResponse {
            user: user.into(),
            access_token: access,
            refresh_token: refresh,
        }),
    ))
}

/// `POST /auth/refresh` — exchange the refresh token (cookie or body) for a
/// rotated pair. The body is optional; the cookie wins when both are
/// present.
pub async fn refresh_handler(
    State(state): State<AppState>,
    jar: CookieJar,
    body: String,
) -> AppResult<impl IntoResponse> {
    let body_token = serde_json::from_str::<RefreshRequest>(&body)
        .ok()
        .and_then(|b| b.refresh_token);
    let presented = jar
        .get(cookies::REFRESH_COOKIE)
        .map(|c| c.value().to_string())
        .or(body_token)
        .ok_or_else(|| AppError::Unauthorized("Token missing".into()))?;

    let (access, refresh) = auth::refresh(&state.pool, &state.config, &presented).await?;
    let jar = jar
        .add(cookies::access_cookie(&access, &state.config))
        .add(cookies::refresh_cookie(&refresh, &state.config));
    Ok((
        jar,
        Json(TokenPairResponse {
            access_token: access,
            refresh_token: refresh,
        }),
    ))
}

/// `POST /auth/logout` — clear the stored refresh token and both cookies.
pub async fn logout_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    auth::logout(&state.pool, &user.id).await?;
    let jar = jar
        .add(cookies::clear_access_cookie(&state.config))
        .add(cookies::clear_refresh_cookie(&state.config));
    Ok((
        jar,
        Json(MessageResponse {
            message: "Logged out".into(),
        }),
    ))
}

/// `GET /auth/me` — the authenticated user's sanitized profile.
pub async fn me_handler(
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Json<UserResponse> {
    Json(UserResponse { user: user.into() })
}

/// `PATCH /auth/change-password` — change password after verifying the old
/// one.
pub async fn change_password_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<ChangePasswordRequest>,
) -> AppResult<Json<MessageResponse>> {
    auth::change_password(&state.pool, &user.id, &body.old_password, &body.new_password).await?;
    Ok(Json(MessageResponse {
        message: "Password updated successfully".into(),
    }))
}

/// `PATCH /auth/update` — update account name and/or email.
pub async fn update_account_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<UpdateAccountRequest>,
) -> AppResult<Json<UserResponse>> {
    let user = auth::update_account(
        &state.pool,
        &user.id,
        body.name.as_deref(),
        body.email.as_deref(),
    )
    .await?;
    Ok(Json(UserResponse { user: user.into() }))
}

/// `DELETE /auth/delete-account` — delete the account and clear cookies.
pub async fn delete_account_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    auth::delete_account(&state.pool, &user.id).await?;
    let jar = jar
        .add(cookies::clear_access_cookie(&state.config))
        .add(cookies::clear_refresh_cookie(&state.config));
    Ok((
        jar,
        Json(MessageResponse {
            message: "Account deleted".into(),
        }),
    ))
}
