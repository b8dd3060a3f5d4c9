//! List query engine module.
//!
//! This module provides:
//! - Descriptor: normalized list request shared by both backends
//! - EntitySchema: per-entity column catalogs (CATEGORY, PRODUCT)
//! - RelationalQueryBuilder: SeaQuery-based SQL generation
//! - SearchQueryBuilder: search-index request generation
//! - ListParams: query-string parsing into a Descriptor

mod error;
mod params;
pub mod schema;
mod search_builder;
mod sql_builder;
pub mod types;

pub use error::QueryError;
pub use params::{ListParams, parse_positive_int};
pub use schema::{CATEGORY, ColumnKind, EntitySchema, PRODUCT};
pub use search_builder::{
    BoolQuery, Clause, MatchOperator, MatchQuery, RangeQuery, SearchQuery, SearchQueryBuilder,
    SearchRequest, WildcardQuery,
};
pub use sql_builder::{RelationalQuery, RelationalQueryBuilder};
pub use types::{
    DEFAULT_PAGE, DEFAULT_PAGE_SIZE, Descriptor, FilterOperation, FilterValue, MAX_PAGE_SIZE,
    OrderSpec, PaginatedResult, SearchFilter, SortDirection,
};

/// Turns a validated [`Descriptor`] into a backend-specific query.
///
/// Implementations validate the descriptor against their entity schema and
/// refuse to build anything on failure.
pub trait QueryBuilder {
    type Output;

    fn build(&self, descriptor: &Descriptor) -> Result<Self::Output, QueryError>;
}
