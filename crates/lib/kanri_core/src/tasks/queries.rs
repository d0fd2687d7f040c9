//! Task queries. Tasks are loaded with their assignee set and subtasks.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::task::{Subtask, Task, TaskPriority, TaskStatus};

type TaskRow = (
    String,
    String,
    String,
    Option<String>,
    Option<DateTime<Utc>>,
    String,
    String,
    Vec<String>,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

const TASK_COLUMNS: &str = "id::text, board_id::text, title, description, due_date, \
     status::text, priority::text, tags, task_admin::text, created_at, updated_at";

/// Fields for a new task. The board reference is fixed at creation and
/// never moves afterwards.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Vec<String>,
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct TaskUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub due_date: Option<DateTime<Utc>>,
    pub status: Option<TaskStatus>,
    pub priority: Option<TaskPriority>,
    pub tags: Option<Vec<String>>,
}

fn task_from_row(
    (
        id,
        board_id,
        title,
        description,
        due_date,
        status,
        priority,
        tags,
        task_admin,
        created_at,
        updated_at,
    ): TaskRow,
    assigned_to: Vec<String>,
    subtasks: Vec<Subtask>,
) -> Task {
    Task {
        id,
        board_id,
        title,
        description,
        due_date,
        status: TaskStatus::from_db(&status),
        priority: TaskPriority::from_db(&priority),
        tags,
        task_admin,
        assigned_to,
        subtasks,
        created_at,
        updated_at,
    }
}

async fn assignees_for(pool: &PgPool, task_id: &str) -> Result<Vec<String>, sqlx::Error> {
    sqlx::query_scalar::<_, String>(
        "SELECT user_id::text FROM task_assignees WHERE task_id::text = $1",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await
}

async fn subtasks_for(pool: &PgPool, task_id: &str) -> Result<Vec<Subtask>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String, bool)>(
        "SELECT id::text, title, is_completed FROM subtasks \
         WHERE task_id::text = $1 ORDER BY created_at",
    )
    .bind(task_id)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(id, title, is_completed)| Subtask {
            id,
            title,
            is_completed,
        })
        .collect())
}

async fn assemble(pool: &PgPool, row: TaskRow) -> Result<Task, sqlx::Error> {
    let assigned_to = assignees_for(pool, &row.0).await?;
    let subtasks = subtasks_for(pool, &row.0).await?;
    Ok(task_from_row(row, assigned_to, subtasks))
}

/// Create a task on a board. The creator becomes task admin and is
/// auto-assigned, so the assignee set is non-empty from the start.
pub async fn create_task(
    pool: &PgPool,
    board_id: &str,
    task_admin: &str,
    new: NewTask,
) -> Result<Task, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "INSERT INTO tasks (board_id, title, description, due_date, status, priority, tags, task_admin) \
         VALUES ($1::uuid, $2, $3, $4, $5::task_status, $6::task_priority, $7, $8::uuid) \
         RETURNING {TASK_COLUMNS}"
    ))
    .bind(board_id)
    .bind(&new.title)
    .bind(new.description.as_deref())
    .bind(new.due_date)
    .bind(new.status.unwrap_or(TaskStatus::Todo).as_str())
    .bind(new.priority.unwrap_or(TaskPriority::Low).as_str())
    .bind(&new.tags)
    .bind(task_admin)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query("INSERT INTO task_assignees (task_id, user_id) VALUES ($1::uuid, $2::uuid)")
        .bind(&row.0)
        .bind(task_admin)
        .execute(&mut *tx)
        .await?;
    tx.commit().await?;

    Ok(task_from_row(row, vec![task_admin.to_string()], vec![]))
}

/// Fetch one task with assignees and subtasks.
pub async fn find_task(pool: &PgPool, task_id: &str) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE id::text = $1"
    ))
    .bind(task_id)
    .fetch_optional(pool)
    .await?;
    match row {
        None => Ok(None),
        Some(row) => Ok(Some(assemble(pool, row).await?)),
    }
}

/// All tasks on a board.
pub async fn tasks_for_board(pool: &PgPool, board_id: &str) -> Result<Vec<Task>, sqlx::Error> {
    let rows = sqlx::query_as::<_, TaskRow>(&format!(
        "SELECT {TASK_COLUMNS} FROM tasks WHERE board_id::text = $1 ORDER BY created_at"
    ))
    .bind(board_id)
    .fetch_all(pool)
    .await?;

    let mut tasks = Vec::with_capacity(rows.len());
    for row in rows {
        tasks.push(assemble(pool, row).await?);
    }
    Ok(tasks)
}

/// Apply a partial update.
pub async fn update_task(
    pool: &PgPool,
    task_id: &str,
    update: TaskUpdate,
) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "UPDATE tasks SET \
             title = COALESCE($2, title), \
             description = COALESCE($3, description), \
             due_date = COALESCE($4, due_date), \
             status = COALESCE($5::task_status, status), \
             priority = COALESCE($6::task_priority, priority), \
             tags = COALESCE($7, tags), \
             updated_at = now() \
         WHERE id::text = $1 RETURNING {TASK_COLUMNS}"
    ))
    .bind(task_id)
    .bind(update.title.as_deref())
    .bind(update.description.as_deref())
    .bind(update.due_date)
    .bind(update.status.map(|s| s.as_str()))
    .bind(update.priority.map(|p| p.as_str()))
    .bind(update.tags)
    .fetch_optional(pool)
    .await?;
    match row {
        None => Ok(None),
        Some(row) => Ok(Some(assemble(pool, row).await?)),
    }
}

/// Move a task to another status column.
pub async fn set_status(
    pool: &PgPool,
    task_id: &str,
    status: TaskStatus,
) -> Result<Option<Task>, sqlx::Error> {
    let row = sqlx::query_as::<_, TaskRow>(&format!(
        "UPDATE tasks SET status = $2::task_status, updated_at = now() \
         WHERE id::text = $1 RETURNING {TASK_COLUMNS}"
    ))
    .bind(task_id)
    .bind(status.as_str())
    .fetch_optional(pool)
    .await?;
    match row {
        None => Ok(None),
        Some(row) => Ok(Some(assemble(pool, row).await?)),
    }
}

/// Delete a task; assignees and subtasks cascade.
pub async fn delete_task(pool: &PgPool, task_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM tasks WHERE id::text = $1")
        .bind(task_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Assign a user to a task. Already-assigned is a no-op.
pub async fn assign_user(
    pool: &PgPool,
    task_id: &str,
    user_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query(
        "INSERT INTO task_assignees (task_id, user_id) \
         SELECT t.id, u.id FROM tasks t, users u WHERE t.id::text = $1 AND u.id::text = $2 \
         ON CONFLICT (task_id, user_id) DO NOTHING",
    )
    .bind(task_id)
    .bind(user_id)
    .execute(pool)
    .await?;
    find_task(pool, task_id).await
}

/// Remove a user from a task's assignee set.
pub async fn unassign_user(
    pool: &PgPool,
    task_id: &str,
    user_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    sqlx::query("DELETE FROM task_assignees WHERE task_id::text = $1 AND user_id::text = $2")
        .bind(task_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    find_task(pool, task_id).await
}

/// Add a subtask, returning the refreshed task. `None` when the task is gone.
pub async fn add_subtask(
    pool: &PgPool,
    task_id: &str,
    title: &str,
) -> Result<Option<Task>, sqlx::Error> {
    let result = sqlx::query(
        "INSERT INTO subtasks (task_id, title) SELECT id, $2 FROM tasks WHERE id::text = $1",
    )
    .bind(task_id)
    .bind(title)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_task(pool, task_id).await
}

/// Update a subtask's title and/or completion flag. `None` when the subtask
/// does not exist on this task.
pub async fn update_subtask(
    pool: &PgPool,
    task_id: &str,
    subtask_id: &str,
    title: Option<&str>,
    is_completed: Option<bool>,
) -> Result<Option<Task>, sqlx::Error> {
    let result = sqlx::query(
        "UPDATE subtasks SET title = COALESCE($3, title), \
         is_completed = COALESCE($4, is_completed) \
         WHERE id::text = $2 AND task_id::text = $1",
    )
    .bind(task_id)
    .bind(subtask_id)
    .bind(title)
    .bind(is_completed)
    .execute(pool)
    .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_task(pool, task_id).await
}

/// Delete a subtask. `None` when the subtask does not exist on this task.
pub async fn delete_subtask(
    pool: &PgPool,
    task_id: &str,
    subtask_id: &str,
) -> Result<Option<Task>, sqlx::Error> {
    let result = sqlx::query("DELETE FROM subtasks WHERE id::text = $2 AND task_id::text = $1")
        .bind(task_id)
        .bind(subtask_id)
        .execute(pool)
        .await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    find_task(pool, task_id).await
}
