//! Cross-entity search: users by name/email, boards by name, tasks by
//! title/description, all case-insensitive substring matches.

use serde::Serialize;
use sqlx::PgPool;

#[derive(Debug, Clone, Serialize)]
pub struct UserHit {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct BoardHit {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct TaskHit {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchResults {
    pub users: Vec<UserHit>,
    pub boards: Vec<BoardHit>,
    pub tasks: Vec<TaskHit>,
}

pub async fn global_search(pool: &PgPool, query: &str) -> Result<SearchResults, sqlx::Error> {
    let pattern = format!("%{query}%");

    let users = sqlx::query_as::<_, (String, String, String)>(
        "SELECT id::text, name, email FROM users \
         WHERE name ILIKE $1 OR email ILIKE $1 ORDER BY name",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, name, email)| UserHit { id, name, email })
    .collect();

    let boards = sqlx::query_as::<_, (String, String)>(
        "SELECT id::text, name FROM boards WHERE name ILIKE $1 ORDER BY name",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, name)| BoardHit { id, name })
    .collect();

    let tasks = sqlx::query_as::<_, (String, String, Option<String>)>(
        "SELECT id::text, title, description FROM tasks \
         WHERE title ILIKE $1 OR description ILIKE $1 ORDER BY title",
    )
    .bind(&pattern)
    .fetch_all(pool)
    .await?
    .into_iter()
    .map(|(id, title, description)| TaskHit {
        id,
        title,
        description,
    })
    .collect();

    Ok(SearchResults {
        users,
        boards,
        tasks,
    })
}
