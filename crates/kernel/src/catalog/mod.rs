//! Catalog module.
//!
//! This module provides:
//! - CatalogService: relational list and lookup queries
//! - ProductAggregation: facet counts and price statistics

mod aggregation;
mod service;

pub use aggregation::{FacetCount, PriceSummary, ProductAggregation, sort_by_count_desc};
pub use service::CatalogService;
