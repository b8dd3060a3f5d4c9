//! Configuration loaded from environment variables.

use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port (default: 3000).
    pub port: u16,

    /// PostgreSQL connection URL.
    pub database_url: String,

    /// Maximum database connections in pool (default: 10).
    pub database_max_connections: u32,

    /// Search cluster base URL (default: http://127.0.0.1:9200).
    pub search_url: String,

    /// Basic-auth user for the search cluster.
    pub search_username: Option<String>,

    /// Basic-auth password for the search cluster.
    pub search_password: Option<String>,

    /// Product index name (default: products).
    pub search_index: String,

    /// Search HTTP client timeout (default: 10s).
    pub search_timeout: Duration,

    /// CORS allowed origins; empty disables CORS.
    pub cors_allowed_origins: Vec<String>,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let port = env::var("PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse()
            .context("PORT must be a valid u16")?;

        let database_url =
            env::var("DATABASE_URL").context("DATABASE_URL environment variable is required")?;

        let database_max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("DATABASE_MAX_CONNECTIONS must be a valid u32")?;

        let search_url =
            env::var("SEARCH_URL").unwrap_or_else(|_| "http://127.0.0.1:9200".to_string());

        let search_username = env::var("SEARCH_USERNAME").ok().filter(|s| !s.is_empty());
        let search_password = env::var("SEARCH_PASSWORD").ok().filter(|s| !s.is_empty());

        let search_index = env::var("SEARCH_INDEX").unwrap_or_else(|_| "products".to_string());

        let search_timeout_secs: u64 = env::var("SEARCH_TIMEOUT_SECS")
            .unwrap_or_else(|_| "10".to_string())
            .parse()
            .context("SEARCH_TIMEOUT_SECS must be a valid number of seconds")?;

        let cors_allowed_origins = env::var("CORS_ALLOWED_ORIGINS")
            .map(|v| parse_origins(&v))
            .unwrap_or_default();

        Ok(Self {
            port,
            database_url,
            database_max_connections,
            search_url,
            search_username,
            search_password,
            search_index,
            search_timeout: Duration::from_secs(search_timeout_secs),
            cors_allowed_origins,
        })
    }

    /// Whether any CORS origin is configured.
    pub fn cors_enabled(&self) -> bool {
        !self.cors_allowed_origins.is_empty()
    }
}

/// Split a comma-separated origin list, dropping blanks.
fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}
