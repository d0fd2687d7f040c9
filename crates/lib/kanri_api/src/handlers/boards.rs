//! Board request handlers. Role gates run in middleware before these; the
//! admin self-removal guard lives here because it concerns the *target* of
//! the mutation, not the caller.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use kanri_core::models::board::BoardRole;
use kanri_core::{boards, policy};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{
    AddMemberRequest, BoardResponse, BoardsResponse, CreateBoardRequest, MessageResponse,
    UpdateBoardRequest,
};

#[derive(Debug, Deserialize)]
pub struct MemberPath {
    pub board_id: String,
    pub user_id: String,
}

/// `POST /boards` — create a board; the creator becomes admin and sole
/// member.
pub async fn create_board_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateBoardRequest>,
) -> AppResult<impl IntoResponse> {
    if body.name.trim().is_empty() {
        return Err(AppError::Validation(
            "Please include a name for the board".into(),
        ));
    }
    if body.color.trim().is_empty() {
        return Err(AppError::Validation(
            "Please include a color for the board".into(),
        ));
    }
    let board = boards::queries::create_board(&state.pool, &body.name, &body.color, &user.id).await?;
    Ok((
        StatusCode::CREATED,
        Json(BoardResponse {
            message: "Board created successfully".into(),
            board: board.into(),
        }),
    ))
}

/// `GET /boards` — boards the caller is a member of.
pub async fn list_boards_handler(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> AppResult<Json<BoardsResponse>> {
    let boards = boards::queries::boards_for_user(&state.pool, &user.id).await?;
    Ok(Json(BoardsResponse {
        message: "Boards fetched successfully".into(),
        boards: boards.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /boards/{board_id}` — one board with its member list.
pub async fn get_board_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> AppResult<Json<BoardResponse>> {
    let board = boards::queries::find_board(&state.pool, &board_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    Ok(Json(BoardResponse {
        message: "Board fetched successfully".into(),
        board: board.into(),
    }))
}

/// `PATCH /boards/{board_id}` — rename or recolor.
pub async fn update_board_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<UpdateBoardRequest>,
) -> AppResult<Json<BoardResponse>> {
    let board = boards::queries::update_board(
        &state.pool,
        &board_id,
        body.name.as_deref(),
        body.color.as_deref(),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    Ok(Json(BoardResponse {
        message: "Board updated successfully".into(),
        board: board.into(),
    }))
}

/// `DELETE /boards/{board_id}` — delete a board; tasks cascade.
pub async fn delete_board_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> AppResult<Json<MessageResponse>> {
    if !boards::queries::delete_board(&state.pool, &board_id).await? {
        return Err(AppError::NotFound("Board not found".into()));
    }
    Ok(Json(MessageResponse {
        message: "Board deleted successfully".into(),
    }))
}

/// `POST /boards/{board_id}/members` — add a member.
pub async fn add_member_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Json(body): Json<AddMemberRequest>,
) -> AppResult<Json<BoardResponse>> {
    kanri_core::auth::queries::find_user_by_id(&state.pool, &body.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let board = boards::queries::add_member(
        &state.pool,
        &board_id,
        &body.user_id,
        body.role.unwrap_or(BoardRole::Member),
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    Ok(Json(BoardResponse {
        message: "Member added successfully".into(),
        board: board.into(),
    }))
}

/// `DELETE /boards/{board_id}/members/{user_id}` — remove a member. The
/// designated admin can never be removed, even by themselves.
pub async fn remove_member_handler(
    State(state): State<AppState>,
    Path(path): Path<MemberPath>,
) -> AppResult<Json<BoardResponse>> {
    let board = boards::queries::find_board(&state.pool, &path.board_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    policy::require_member_removable(&board, &path.user_id)?;

    let board = boards::queries::remove_member(&state.pool, &path.board_id, &path.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Board not found".into()))?;
    Ok(Json(BoardResponse {
        message: "Member removed successfully".into(),
        board: board.into(),
    }))
}
