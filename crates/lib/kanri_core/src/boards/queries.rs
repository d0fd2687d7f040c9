//! Board queries. Boards are always loaded with their full member list,
//! since that list is what the authorization gates evaluate.

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::models::board::{Board, BoardMember, BoardRole};

type BoardRow = (
    String,
    String,
    String,
    String,
    DateTime<Utc>,
    DateTime<Utc>,
);

const BOARD_COLUMNS: &str = "id::text, name, color, admin_id::text, created_at, updated_at";

fn board_from_row(
    (id, name, color, admin_id, created_at, updated_at): BoardRow,
    members: Vec<BoardMember>,
) -> Board {
    Board {
        id,
        name,
        color,
        admin_id,
        members,
        created_at,
        updated_at,
    }
}

async fn members_for(pool: &PgPool, board_id: &str) -> Result<Vec<BoardMember>, sqlx::Error> {
    let rows = sqlx::query_as::<_, (String, String)>(
        "SELECT user_id::text, role::text FROM board_members WHERE board_id::text = $1",
    )
    .bind(board_id)
    .fetch_all(pool)
    .await?;
    Ok(rows
        .into_iter()
        .map(|(user_id, role)| BoardMember {
            user_id,
            role: BoardRole::from_db(&role),
        })
        .collect())
}

/// Create a board. The creator becomes the designated admin and the sole
/// member with role `admin`, in one transaction, so the admin-is-a-member
/// invariant holds from the start.
pub async fn create_board(
    pool: &PgPool,
    name: &str,
    color: &str,
    admin_id: &str,
) -> Result<Board, sqlx::Error> {
    let mut tx = pool.begin().await?;
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        "INSERT INTO boards (name, color, admin_id) VALUES ($1, $2, $3::uuid) \
         RETURNING {BOARD_COLUMNS}"
    ))
    .bind(name)
    .bind(color)
    .bind(admin_id)
    .fetch_one(&mut *tx)
    .await?;
    sqlx::query(
        "INSERT INTO board_members (board_id, user_id, role) VALUES ($1::uuid, $2::uuid, 'admin')",
    )
    .bind(&row.0)
    .bind(admin_id)
    .execute(&mut *tx)
    .await?;
    tx.commit().await?;

    let members = vec![BoardMember {
        user_id: admin_id.to_string(),
        role: BoardRole::Admin,
    }];
    Ok(board_from_row(row, members))
}

/// Fetch one board with members.
pub async fn find_board(pool: &PgPool, board_id: &str) -> Result<Option<Board>, sqlx::Error> {
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        "SELECT {BOARD_COLUMNS} FROM boards WHERE id::text = $1"
    ))
    .bind(board_id)
    .fetch_optional(pool)
    .await?;
    match row {
        None => Ok(None),
        Some(row) => {
            let members = members_for(pool, &row.0).await?;
            Ok(Some(board_from_row(row, members)))
        }
    }
}

/// Boards the given user is a member of.
pub async fn boards_for_user(pool: &PgPool, user_id: &str) -> Result<Vec<Board>, sqlx::Error> {
    let rows = sqlx::query_as::<_, BoardRow>(
        "SELECT b.id::text, b.name, b.color, b.admin_id::text, b.created_at, b.updated_at \
         FROM boards b JOIN board_members m ON m.board_id = b.id \
         WHERE m.user_id::text = $1 ORDER BY b.created_at",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;

    let mut boards = Vec::with_capacity(rows.len());
    for row in rows {
        let members = members_for(pool, &row.0).await?;
        boards.push(board_from_row(row, members));
    }
    Ok(boards)
}

/// Update name and/or color.
pub async fn update_board(
    pool: &PgPool,
    board_id: &str,
    name: Option<&str>,
    color: Option<&str>,
) -> Result<Option<Board>, sqlx::Error> {
    let row = sqlx::query_as::<_, BoardRow>(&format!(
        "UPDATE boards SET name = COALESCE($2, name), color = COALESCE($3, color), \
         updated_at = now() WHERE id::text = $1 RETURNING {BOARD_COLUMNS}"
    ))
    .bind(board_id)
    .bind(name)
    .bind(color)
    .fetch_optional(pool)
    .await?;
    match row {
        None => Ok(None),
        Some(row) => {
            let members = members_for(pool, &row.0).await?;
            Ok(Some(board_from_row(row, members)))
        }
    }
}

/// Delete a board; tasks and memberships cascade.
pub async fn delete_board(pool: &PgPool, board_id: &str) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM boards WHERE id::text = $1")
        .bind(board_id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Add a member. Re-adding an existing member is a no-op.
pub async fn add_member(
    pool: &PgPool,
    board_id: &str,
    user_id: &str,
    role: BoardRole,
) -> Result<Option<Board>, sqlx::Error> {
    sqlx::query(
        "INSERT INTO board_members (board_id, user_id, role) \
         SELECT b.id, u.id, $3::board_role FROM boards b, users u \
         WHERE b.id::text = $1 AND u.id::text = $2 \
         ON CONFLICT (board_id, user_id) DO NOTHING",
    )
    .bind(board_id)
    .bind(user_id)
    .bind(role.as_str())
    .execute(pool)
    .await?;
    find_board(pool, board_id).await
}

/// Remove a member from the board. The caller is responsible for the
/// admin-removal guard before calling this.
pub async fn remove_member(
    pool: &PgPool,
    board_id: &str,
    user_id: &str,
) -> Result<Option<Board>, sqlx::Error> {
    sqlx::query("DELETE FROM board_members WHERE board_id::text = $1 AND user_id::text = $2")
        .bind(board_id)
        .bind(user_id)
        .execute(pool)
        .await?;
    find_board(pool, board_id).await
}
