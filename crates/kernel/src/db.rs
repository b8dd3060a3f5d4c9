//! Database connection pool management.

use std::time::Duration;

use anyhow::{Context, Result};
use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::debug;

use crate::config::Config;

/// Upper bound on waiting for a pooled connection.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a PostgreSQL connection pool.
pub async fn create_pool(config: &Config) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(config.database_max_connections)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(&config.database_url)
        .await
        .context("failed to connect to PostgreSQL")?;

    debug!(
        max_connections = config.database_max_connections,
        "PostgreSQL pool created"
    );

    Ok(pool)
}

/// Check whether the catalog database answers a trivial query.
pub async fn check_health(pool: &PgPool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}
