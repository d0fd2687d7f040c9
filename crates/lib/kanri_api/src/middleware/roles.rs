//! Role-gate middleware: board/task authorization checks layered after
//! [`super::auth::require_auth`].
//!
//! Each gate fetches a fresh resource snapshot and delegates the actual
//! decision to the pure predicates in `kanri_core::policy`. The snapshots
//! are request-local; nothing is cached between requests.

use axum::{
    RequestExt,
    extract::{Path, Request, State},
    middleware::Next,
    response::Response,
};
use serde::Deserialize;

use kanri_core::{boards, policy, tasks};

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::CurrentUser;

#[derive(Debug, Deserialize)]
struct BoardParams {
    board_id: String,
}

#[derive(Debug, Deserialize)]
struct TaskParams {
    task_id: String,
}

fn principal_id(request: &Request) -> Result<String, AppError> {
    request
        .extensions()
        .get::<CurrentUser>()
        .map(|u| u.0.id.clone())
        .ok_or_else(|| AppError::Unauthorized("No authenticated user".into()))
}

async fn board_params(request: &mut Request) -> Result<BoardParams, AppError> {
    let Path(params) = request
        .extract_parts::<Path<BoardParams>>()
        .await
        .map_err(|_| AppError::Validation("Invalid path parameters".into()))?;
    Ok(params)
}

async fn task_params(request: &mut Request) -> Result<TaskParams, AppError> {
    let Path(params) = request
        .extract_parts::<Path<TaskParams>>()
        .await
        .map_err(|_| AppError::Validation("Invalid path parameters".into()))?;
    Ok(params)
}

/// Gate: the caller must appear in the board's member list.
pub async fn board_member_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = board_params(&mut request).await?;
    let user_id = principal_id(&request)?;
    let board = boards::queries::find_board(&state.pool, &params.board_id).await?;
    policy::require_board_member(board.as_ref(), &user_id)?;
    Ok(next.run(request).await)
}

/// Gate: the caller must be the board's designated admin.
pub async fn board_admin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = board_params(&mut request).await?;
    let user_id = principal_id(&request)?;
    let board = boards::queries::find_board(&state.pool, &params.board_id).await?;
    policy::require_board_admin(board.as_ref(), &user_id)?;
    Ok(next.run(request).await)
}

/// Gate: assignee, task admin, or admin of the task's board.
pub async fn task_member_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = task_params(&mut request).await?;
    let user_id = principal_id(&request)?;
    let task = tasks::queries::find_task(&state.pool, &params.task_id).await?;
    let board = match &task {
        Some(t) => boards::queries::find_board(&state.pool, &t.board_id).await?,
        None => None,
    };
    policy::require_task_member(task.as_ref(), board.as_ref(), &user_id)?;
    Ok(next.run(request).await)
}

/// Gate: task admin or admin of the task's board; plain assignees fail.
pub async fn task_or_board_admin_gate(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let params = task_params(&mut request).await?;
    let user_id = principal_id(&request)?;
    let task = tasks::queries::find_task(&state.pool, &params.task_id).await?;
    let board = match &task {
        Some(t) => boards::queries::find_board(&state.pool, &t.board_id).await?,
        None => None,
    };
    policy::require_task_or_board_admin(task.as_ref(), board.as_ref(), &user_id)?;
    Ok(next.run(request).await)
}
