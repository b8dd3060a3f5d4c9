//! Category API routes.

use axum::Router;
use axum::extract::{Query, State};
use axum::response::Json;
use axum::routing::get;
use serde_json::Value;

use crate::error::AppResult;
use crate::query::{CATEGORY, ListParams, PaginatedResult};
use crate::state::AppState;

/// Create the category router.
pub fn router() -> Router<AppState> {
    Router::new().route("/categories", get(list_categories))
}

/// List categories from the relational store.
async fn list_categories(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResult<Value>>> {
    let descriptor = CATEGORY.parse_list(&params)?;
    let page = state.catalog().list(&CATEGORY, &descriptor).await?;
    Ok(Json(page))
}
