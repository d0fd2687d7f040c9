//! # kanri_api
//!
//! HTTP API library for Kanri.
//!
//! Route layering mirrors the authorization model: public auth routes, then
//! session-gated routes, then board/task routes behind their role gates.
//! The session middleware wraps all protected routes; role gates wrap only
//! the routes they guard, so they always run after authentication.

pub mod config;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use axum::routing::{delete, get, patch, post};
use sqlx::PgPool;
use tower_http::cors::CorsLayer;

use crate::config::ApiConfig;
use crate::handlers::{auth, boards, search, tasks, users, welcome};
use crate::middleware::{auth::require_auth, roles};

/// Shared application state passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    /// PostgreSQL connection pool.
    pub pool: PgPool,
    /// API configuration.
    pub config: ApiConfig,
}

/// Run embedded database migrations.
///
/// Delegates to `kanri_core::migrate::migrate()` which owns the migration
/// files.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    kanri_core::migrate::migrate(pool).await
}

/// Builds the Axum router with all routes and shared state.
pub fn router(state: AppState) -> Router {
    let origin = state
        .config
        .cors_origin
        .parse::<HeaderValue>()
        .unwrap_or_else(|_| HeaderValue::from_static("http://localhost:5173"));
    // Credentialed CORS: the browser rejects wildcards when cookies are in
    // play, so everything is listed explicitly.
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PATCH, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);

    // Public routes (no auth required)
    let public = Router::new()
        .route("/", get(welcome))
        .route("/auth/register", post(auth::register_handler))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/refresh", post(auth::refresh_handler));

    // Session-gated routes with no resource role requirement
    let session = Router::new()
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/me", get(auth::me_handler))
        .route("/auth/change-password", patch(auth::change_password_handler))
        .route("/auth/update", patch(auth::update_account_handler))
        .route("/auth/delete-account", delete(auth::delete_account_handler))
        .route("/users", get(users::list_users_handler))
        .route("/users/search", get(users::search_users_handler))
        .route("/users/{user_id}", get(users::get_user_handler))
        .route(
            "/boards",
            post(boards::create_board_handler).get(boards::list_boards_handler),
        )
        .route("/search", get(search::global_search_handler));

    // Board-member gate
    let board_member = Router::new()
        .route(
            "/boards/{board_id}",
            get(boards::get_board_handler).patch(boards::update_board_handler),
        )
        .route("/boards/{board_id}/tasks", get(tasks::list_tasks_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            roles::board_member_gate,
        ));

    // Board-admin gate
    let board_admin = Router::new()
        .route("/boards/{board_id}", delete(boards::delete_board_handler))
        .route("/boards/{board_id}/members", post(boards::add_member_handler))
        .route(
            "/boards/{board_id}/members/{user_id}",
            delete(boards::remove_member_handler),
        )
        .route("/boards/{board_id}/tasks", post(tasks::create_task_handler))
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            roles::board_admin_gate,
        ));

    // Task-member gate
    let task_member = Router::new()
        .route(
            "/boards/{board_id}/tasks/{task_id}",
            get(tasks::get_task_handler)
                .patch(tasks::update_task_handler)
                .delete(tasks::delete_task_handler),
        )
        .route(
            "/boards/{board_id}/tasks/{task_id}/status",
            patch(tasks::status_handler),
        )
        .route(
            "/boards/{board_id}/tasks/{task_id}/subtasks",
            post(tasks::add_subtask_handler),
        )
        .route(
            "/boards/{board_id}/tasks/{task_id}/subtasks/{subtask_id}",
            patch(tasks::update_subtask_handler).delete(tasks::delete_subtask_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            roles::task_member_gate,
        ));

    // Task-or-board-admin gate
    let task_admin = Router::new()
        .route(
            "/boards/{board_id}/tasks/{task_id}/assignees",
            post(tasks::assign_handler),
        )
        .route(
            "/boards/{board_id}/tasks/{task_id}/assignees/{user_id}",
            delete(tasks::unassign_handler),
        )
        .route_layer(axum::middleware::from_fn_with_state(
            state.clone(),
            roles::task_or_board_admin_gate,
        ));

    // Authentication wraps every protected route, outside the role gates.
    let protected = session
        .merge(board_member)
        .merge(board_admin)
        .merge(task_member)
        .merge(task_admin)
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ));

    Router::new()
        .nest("/api/v1", public.merge(protected))
        .layer(cors)
        .with_state(state)
}
