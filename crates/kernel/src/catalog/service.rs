//! Catalog service.
//!
//! Executes relational list and lookup queries built by
//! [`RelationalQueryBuilder`] against the connection pool.

use serde_json::Value;
use sqlx::PgPool;
use tracing::debug;

use super::aggregation::{self, ProductAggregation};
use crate::error::{AppError, AppResult};
use crate::query::{Descriptor, EntitySchema, PRODUCT, PaginatedResult, RelationalQueryBuilder};

/// Read-only access to categories and products in the relational store.
#[derive(Clone)]
pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    /// Create a new catalog service.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// List one page of an entity.
    ///
    /// The data and count queries share the same filters and run
    /// concurrently; either failing fails the request.
    pub async fn list(
        &self,
        schema: &'static EntitySchema,
        descriptor: &Descriptor,
    ) -> AppResult<PaginatedResult<Value>> {
        let builder = RelationalQueryBuilder::new(schema);
        let data_sql = builder.build_data(descriptor)?;
        let count_sql = builder.build_count(descriptor)?;

        debug!(entity = schema.entity, sql = %data_sql, "executing list query");

        let wrapped = format!("SELECT row_to_json(t) FROM ({data_sql}) t");
        let (rows, total) = tokio::try_join!(
            sqlx::query_scalar::<_, Value>(&wrapped).fetch_all(&self.pool),
            sqlx::query_scalar::<_, i64>(&count_sql).fetch_one(&self.pool),
        )?;

        Ok(PaginatedResult::assemble(
            rows,
            u64::try_from(total).unwrap_or(0),
            descriptor.page,
            descriptor.page_size,
        ))
    }

    /// Load one product by id with the requested projection.
    pub async fn product_by_id(&self, id: i64, select: &[String]) -> AppResult<Value> {
        let sql = RelationalQueryBuilder::new(&PRODUCT).build_by_id(id, select)?;

        debug!(id, sql = %sql, "loading product");

        sqlx::query_scalar::<_, Value>(&format!("SELECT row_to_json(t) FROM ({sql}) t"))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::NotFound)
    }

    /// Facet counts and price statistics over every product.
    pub async fn product_aggregation(&self) -> AppResult<ProductAggregation> {
        Ok(aggregation::product_aggregation(&self.pool).await?)
    }
}
