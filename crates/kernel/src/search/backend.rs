//! Search index backends.
//!
//! Provides the trait the product search service talks to and an HTTP
//! implementation for Elasticsearch-compatible clusters.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Errors from the search index.
#[derive(Debug, Error)]
pub enum SearchError {
    /// The request never produced a response (connect, timeout, decode).
    #[error("search transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The cluster answered with a non-success status.
    #[error("search index returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The request body could not be encoded.
    #[error("failed to encode search request: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Search index backend trait.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Run a search request against an index and return the raw response.
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError>;

    /// Check whether the cluster is reachable.
    async fn ping(&self) -> bool;
}

/// Connection settings for [`HttpSearchBackend`].
#[derive(Debug, Clone)]
pub struct HttpSearchSettings {
    pub base_url: String,
    pub username: Option<String>,
    pub password: Option<String>,
    pub timeout: Duration,
}

/// Search backend speaking the Elasticsearch REST API.
#[derive(Clone)]
pub struct HttpSearchBackend {
    client: reqwest::Client,
    base_url: String,
    credentials: Option<(String, Option<String>)>,
}

impl HttpSearchBackend {
    /// Create a new HTTP backend.
    pub fn new(settings: HttpSearchSettings) -> Self {
        let client = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()
            .unwrap_or_default();

        Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            credentials: settings.username.map(|user| (user, settings.password)),
        }
    }

    fn request(&self, method: reqwest::Method, path: &str) -> reqwest::RequestBuilder {
        let request = self.client.request(method, format!("{}{path}", self.base_url));
        match &self.credentials {
            Some((user, password)) => request.basic_auth(user, password.as_ref()),
            None => request,
        }
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn search(&self, index: &str, body: &Value) -> Result<Value, SearchError> {
        let response = self
            .request(reqwest::Method::POST, &format!("/{index}/_search"))
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SearchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let value = response.json::<Value>().await?;
        debug!(index = %index, "search request completed");
        Ok(value)
    }

    async fn ping(&self) -> bool {
        match self.request(reqwest::Method::GET, "/").send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                debug!(error = %e, "search index ping failed");
                false
            }
        }
    }
}
