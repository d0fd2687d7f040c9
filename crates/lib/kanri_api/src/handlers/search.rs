//! Cross-entity search handler.

use axum::Json;
use axum::extract::{Query, State};

use crate::AppState;
use crate::error::{AppError, AppResult};
use crate::models::{SearchParams, SearchResponse};

/// `GET /search?query=…` — match users, boards, and tasks in one call.
pub async fn global_search_handler(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<Json<SearchResponse>> {
    let query = params.query.unwrap_or_default();
    if query.trim().is_empty() {
        return Err(AppError::Validation("Search query is required".into()));
    }
    let results = kanri_core::search::global_search(&state.pool, query.trim()).await?;
    Ok(Json(results.into()))
}
