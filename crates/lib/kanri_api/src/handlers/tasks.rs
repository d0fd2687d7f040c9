//! Task request handlers. The board-admin / task-member /
//! task-or-board-admin gates run in middleware before these.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde::Deserialize;

use kanri_core::tasks::queries::{self, NewTask, TaskUpdate};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::middleware::auth::CurrentUser;
use crate::models::{
    AssignRequest, CreateSubtaskRequest, CreateTaskRequest, MessageResponse, StatusRequest,
    TaskResponse, TasksResponse, UpdateSubtaskRequest, UpdateTaskRequest,
};

#[derive(Debug, Deserialize)]
pub struct TaskPath {
    pub task_id: String,
}

#[derive(Debug, Deserialize)]
pub struct SubtaskPath {
    pub task_id: String,
    pub subtask_id: String,
}

#[derive(Debug, Deserialize)]
pub struct AssigneePath {
    pub task_id: String,
    pub user_id: String,
}

/// `POST /boards/{board_id}/tasks` — create a task; the creator becomes
/// task admin and is auto-assigned.
pub async fn create_task_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(body): Json<CreateTaskRequest>,
) -> AppResult<impl IntoResponse> {
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Task title is required".into()));
    }
    let task = queries::create_task(
        &state.pool,
        &board_id,
        &user.id,
        NewTask {
            title: body.title,
            description: body.description,
            due_date: body.due_date,
            status: body.status,
            priority: body.priority,
            tags: body.tags.unwrap_or_default(),
        },
    )
    .await?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Task created successfully".into(),
            task: task.into(),
        }),
    ))
}

/// `GET /boards/{board_id}/tasks` — all tasks on the board.
pub async fn list_tasks_handler(
    State(state): State<AppState>,
    Path(board_id): Path<String>,
) -> AppResult<Json<TasksResponse>> {
    let tasks = queries::tasks_for_board(&state.pool, &board_id).await?;
    Ok(Json(TasksResponse {
        message: "Tasks fetched successfully".into(),
        tasks: tasks.into_iter().map(Into::into).collect(),
    }))
}

/// `GET /boards/{board_id}/tasks/{task_id}` — one task.
pub async fn get_task_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::find_task(&state.pool, &path.task_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        message: "Task fetched successfully".into(),
        task: task.into(),
    }))
}

/// `PATCH /boards/{board_id}/tasks/{task_id}` — partial update.
pub async fn update_task_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    Json(body): Json<UpdateTaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::update_task(
        &state.pool,
        &path.task_id,
        TaskUpdate {
            title: body.title,
            description: body.description,
            due_date: body.due_date,
            status: body.status,
            priority: body.priority,
            tags: body.tags,
        },
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        message: "Task updated successfully".into(),
        task: task.into(),
    }))
}

/// `DELETE /boards/{board_id}/tasks/{task_id}`.
pub async fn delete_task_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
) -> AppResult<Json<MessageResponse>> {
    if !queries::delete_task(&state.pool, &path.task_id).await? {
        return Err(AppError::NotFound("Task not found".into()));
    }
    Ok(Json(MessageResponse {
        message: "Task deleted successfully".into(),
    }))
}

/// `POST /boards/{board_id}/tasks/{task_id}/assignees` — assign a user.
pub async fn assign_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    Json(body): Json<AssignRequest>,
) -> AppResult<Json<TaskResponse>> {
    kanri_core::auth::queries::find_user_by_id(&state.pool, &body.user_id)
        .await
        .map_err(AppError::from)?
        .ok_or_else(|| AppError::NotFound("User not found".into()))?;

    let task = queries::assign_user(&state.pool, &path.task_id, &body.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        message: "User assigned successfully".into(),
        task: task.into(),
    }))
}

/// `DELETE /boards/{board_id}/tasks/{task_id}/assignees/{user_id}` —
/// remove a user from the assignee set.
pub async fn unassign_handler(
    State(state): State<AppState>,
    Path(path): Path<AssigneePath>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::unassign_user(&state.pool, &path.task_id, &path.user_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        message: "User removed from task".into(),
        task: task.into(),
    }))
}

/// `PATCH /boards/{board_id}/tasks/{task_id}/status` — move between
/// status columns.
pub async fn status_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    Json(body): Json<StatusRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::set_status(&state.pool, &path.task_id, body.status)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok(Json(TaskResponse {
        message: "Task status updated".into(),
        task: task.into(),
    }))
}

/// `POST /boards/{board_id}/tasks/{task_id}/subtasks`.
pub async fn add_subtask_handler(
    State(state): State<AppState>,
    Path(path): Path<TaskPath>,
    Json(body): Json<CreateSubtaskRequest>,
) -> AppResult<impl IntoResponse> {
    if body.title.trim().is_empty() {
        return Err(AppError::Validation("Subtask title is required".into()));
    }
    let task = queries::add_subtask(&state.pool, &path.task_id, &body.title)
        .await?
        .ok_or_else(|| AppError::NotFound("Task not found".into()))?;
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            message: "Subtask added successfully".into(),
            task: task.into(),
        }),
    ))
}

/// `PATCH /boards/{board_id}/tasks/{task_id}/subtasks/{subtask_id}`.
pub async fn update_subtask_handler(
    State(state): State<AppState>,
    Path(path): Path<SubtaskPath>,
    Json(body): Json<UpdateSubtaskRequest>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::update_subtask(
        &state.pool,
        &path.task_id,
        &path.subtask_id,
        body.title.as_deref(),
        body.is_completed,
    )
    .await?
    .ok_or_else(|| AppError::NotFound("Subtask not found".into()))?;
    Ok(Json(TaskResponse {
        message: "Subtask updated successfully".into(),
        task: task.into(),
    }))
}

/// `DELETE /boards/{board_id}/tasks/{task_id}/subtasks/{subtask_id}`.
pub async fn delete_subtask_handler(
    State(state): State<AppState>,
    Path(path): Path<SubtaskPath>,
) -> AppResult<Json<TaskResponse>> {
    let task = queries::delete_subtask(&state.pool, &path.task_id, &path.subtask_id)
        .await?
        .ok_or_else(|| AppError::NotFound("Subtask not found".into()))?;
    Ok(Json(TaskResponse {
        message: "Subtask deleted successfully".into(),
        task: task.into(),
    }))
}
