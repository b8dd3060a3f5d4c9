//! Storefront Kernel Library
//!
//! Catalog read API over PostgreSQL and the product search index. The
//! `storefront` binary wires these pieces into an HTTP server; integration
//! tests drive [`app`] directly.

pub mod catalog;
pub mod config;
pub mod db;
pub mod error;
pub mod query;
pub mod routes;
pub mod search;
pub mod state;

use axum::Router;

use crate::state::AppState;

/// Build the application router with every route mounted.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes::status::router())
        .merge(routes::health::router())
        .merge(routes::category::router())
        .merge(routes::product::router())
        .with_state(state)
}
