//! Product API routes.
//!
//! Listing goes through the search index by default; the relational store
//! serves the `from-main-database` listing, lookups by id and aggregations.

use axum::Router;
use axum::extract::{Path, Query, State};
use axum::response::Json;
use axum::routing::get;
use serde::Deserialize;
use serde_json::Value;

use crate::catalog::ProductAggregation;
use crate::error::AppResult;
use crate::query::{ListParams, PRODUCT, PaginatedResult, parse_positive_int};
use crate::state::AppState;

/// Largest id accepted in the path.
const MAX_PRODUCT_ID: u64 = i64::MAX as u64;

/// Create the product router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/products", get(search_products))
        .route("/products/from-main-database", get(list_products))
        .route("/products/aggs", get(product_aggregation))
        .route("/products/{id}", get(get_product))
}

#[derive(Debug, Deserialize)]
struct SelectParams {
    select: Option<String>,
}

/// List products from the search index.
async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResult<Value>>> {
    let descriptor = PRODUCT.parse_list(&params)?;
    let page = state.product_search().get_products(&descriptor).await?;
    Ok(Json(page))
}

/// List products from the relational store.
async fn list_products(
    State(state): State<AppState>,
    Query(params): Query<ListParams>,
) -> AppResult<Json<PaginatedResult<Value>>> {
    let descriptor = PRODUCT.parse_list(&params)?;
    let page = state.catalog().list(&PRODUCT, &descriptor).await?;
    Ok(Json(page))
}

async fn product_aggregation(State(state): State<AppState>) -> AppResult<Json<ProductAggregation>> {
    Ok(Json(state.catalog().product_aggregation().await?))
}

/// Load one product by id.
async fn get_product(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    Query(params): Query<SelectParams>,
) -> AppResult<Json<Value>> {
    let id = parse_positive_int("id", &raw_id, Some(MAX_PRODUCT_ID))?;
    let select = PRODUCT.parse_select(params.select.as_deref())?;

    // MAX_PRODUCT_ID keeps the id inside i64
    let id = i64::try_from(id).unwrap_or(i64::MAX);
    let product = state.catalog().product_by_id(id, &select).await?;
    Ok(Json(product))
}
