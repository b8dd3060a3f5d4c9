//! Application state shared across all handlers.

use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tracing::info;

use crate::catalog::CatalogService;
use crate::config::Config;
use crate::db;
use crate::search::{HttpSearchBackend, HttpSearchSettings, ProductSearchService, SearchBackend};

/// Shared application state.
///
/// Wrapped in Arc internally so Clone is cheap.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    /// PostgreSQL connection pool.
    db: PgPool,

    /// Relational list, lookup and aggregation queries.
    catalog: CatalogService,

    /// Product index queries.
    product_search: ProductSearchService,
}

impl AppState {
    /// Create new application state, connecting to the database and wiring
    /// the search backend from configuration.
    pub async fn new(config: &Config) -> Result<Self> {
        let db = db::create_pool(config)
            .await
            .context("failed to create database pool")?;

        let backend = HttpSearchBackend::new(HttpSearchSettings {
            base_url: config.search_url.clone(),
            username: config.search_username.clone(),
            password: config.search_password.clone(),
            timeout: config.search_timeout,
        });

        info!(
            search_url = %config.search_url,
            index = %config.search_index,
            "search backend configured"
        );

        Ok(Self::from_parts(db, Arc::new(backend), &config.search_index))
    }

    /// Assemble state from an existing pool and search backend.
    pub fn from_parts(db: PgPool, backend: Arc<dyn SearchBackend>, index: &str) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                catalog: CatalogService::new(db.clone()),
                product_search: ProductSearchService::new(backend, index),
                db,
            }),
        }
    }

    /// Get the catalog service.
    pub fn catalog(&self) -> &CatalogService {
        &self.inner.catalog
    }

    /// Get the product search service.
    pub fn product_search(&self) -> &ProductSearchService {
        &self.inner.product_search
    }

    /// Check if PostgreSQL is healthy.
    pub async fn postgres_healthy(&self) -> bool {
        db::check_health(&self.inner.db).await
    }

    /// Check if the search index is reachable.
    pub async fn search_healthy(&self) -> bool {
        self.inner.product_search.ping().await
    }
}
