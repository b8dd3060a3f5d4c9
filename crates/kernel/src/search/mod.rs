//! Product search service.
//!
//! Runs list requests against the product index mirrored from the relational
//! store and wraps the hits in the shared pagination envelope.

mod backend;

use std::sync::Arc;

use serde_json::Value;
use tracing::debug;

pub use backend::{HttpSearchBackend, HttpSearchSettings, SearchBackend, SearchError};

use crate::query::{
    Descriptor, PRODUCT, PaginatedResult, QueryBuilder, QueryError, SearchQueryBuilder,
};

/// Errors from a product search.
#[derive(Debug, thiserror::Error)]
pub enum ProductSearchError {
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Search service for the product index.
#[derive(Clone)]
pub struct ProductSearchService {
    backend: Arc<dyn SearchBackend>,
    index: String,
    builder: SearchQueryBuilder,
}

impl ProductSearchService {
    /// Create a new product search service.
    pub fn new(backend: Arc<dyn SearchBackend>, index: impl Into<String>) -> Self {
        Self {
            backend,
            index: index.into(),
            builder: SearchQueryBuilder::new(&PRODUCT),
        }
    }

    /// Search products and return one page of source documents.
    pub async fn get_products(
        &self,
        descriptor: &Descriptor,
    ) -> Result<PaginatedResult<Value>, ProductSearchError> {
        let request = self.builder.build(descriptor)?;
        let body = serde_json::to_value(&request).map_err(SearchError::from)?;

        debug!(index = %self.index, body = %body, "executing product search");

        let response = self.backend.search(&self.index, &body).await?;

        let hits = response.get("hits");
        let total = extract_total(hits.and_then(|h| h.get("total")));
        let data = extract_sources(hits.and_then(|h| h.get("hits")));

        Ok(PaginatedResult::assemble(
            data,
            total,
            descriptor.page,
            descriptor.page_size,
        ))
    }

    /// Whether the search cluster answers.
    pub async fn ping(&self) -> bool {
        self.backend.ping().await
    }
}

/// Read the hit total, which clusters report either as a bare number or as
/// `{ "value": n, "relation": ... }`. Anything else counts as zero.
pub fn extract_total(total: Option<&Value>) -> u64 {
    let value = match total {
        Some(Value::Object(map)) => map.get("value"),
        other => other,
    };
    value.and_then(total_as_u64).unwrap_or(0)
}

/// Non-negative JSON number as a count; floats are truncated.
fn total_as_u64(value: &Value) -> Option<u64> {
    value.as_u64().or_else(|| {
        value
            .as_f64()
            .filter(|n| n.is_finite() && *n >= 0.0)
            .map(|n| n as u64)
    })
}

/// Collect `_source` documents, skipping hits without one.
fn extract_sources(hits: Option<&Value>) -> Vec<Value> {
    hits.and_then(Value::as_array)
        .map(|hits| {
            hits.iter()
                .filter_map(|hit| hit.get("_source"))
                .filter(|source| !source.is_null())
                .cloned()
                .collect()
        })
        .unwrap_or_default()
}
