//! User directory handlers.

use axum::Json;
use axum::extract::{Path, Query, State};

use kanri_core::auth::queries;

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{SearchParams, UserResponse, UsersResponse};

/// `GET /users` — every registered user, sanitized.
pub async fn list_users_handler(State(state): State<AppState>) -> AppResult<Json<UsersResponse>> {
    let users = queries::list_users(&state.pool).await.map_err(AppError::from)?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /users/search?query=…` — match users by name or email fragment.
pub async fn search_users_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<UsersResponse>> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::Validation("Search query is required".into()));
    }
    let users = queries::search_users(&state.pool, query.trim())
        .await
        .map_err(AppError::from)?;
    Ok(Json(UsersResponse {
        users: users.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /users/{user_id}` — one user, sanitized.
pub async fn get_user_handler(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> AppResult<Json<UserResponse>> {
    let user = queries::find_user_by_id(&state.pool, &user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;
    Ok(Json(UserResponse { user: user.into() }))
}
