//! Application error types.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use thiserror::Error;

use crate::query::QueryError;
use crate::search::{ProductSearchError, SearchError};

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("not found")]
    NotFound,

    /// Request parameters failed validation.
    #[error(transparent)]
    Query(#[from] QueryError),

    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("search index error")]
    Search(#[from] SearchError),
}

impl From<ProductSearchError> for AppError {
    fn from(error: ProductSearchError) -> Self {
        match error {
            ProductSearchError::Query(e) => AppError::Query(e),
            ProductSearchError::Search(e) => AppError::Search(e),
        }
    }
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Query(_) => StatusCode::BAD_REQUEST,
            AppError::Database(_) | AppError::Search(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Backing-store details go to the log, never to the client
        let message = match &self {
            AppError::Database(e) => {
                tracing::error!(error = %e, "database error");
                "internal server error".to_string()
            }
            AppError::Search(e) => {
                tracing::error!(error = %e, "search index error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_are_bad_requests() {
        let err = AppError::from(QueryError::NotPositive {
            param: "page",
            value: "0".to_string(),
        });
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.to_string(),
            r#"page parameter is not a positive integer: "0""#
        );
    }

    #[test]
    fn backing_store_errors_are_internal() {
        let err = AppError::from(SearchError::Status {
            status: 503,
            body: String::new(),
        });
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn not_found_status() {
        assert_eq!(
            AppError::NotFound.into_response().status(),
            StatusCode::NOT_FOUND
        );
    }
}
