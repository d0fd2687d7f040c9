//! Request handlers.

pub mod auth;
pub mod boards;
pub mod search;
pub mod tasks;
pub mod users;

/// `GET /` — API welcome banner.
pub async fn welcome() -> &'static str {
    "Welcome to the Kanri Board API"
}
