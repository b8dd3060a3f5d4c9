//! Liveness endpoint.

use axum::Router;
use axum::routing::get;

use crate::state::AppState;

/// Create the status router.
pub fn router() -> Router<AppState> {
    Router::new().route("/status/ping", get(ping))
}

async fn ping() -> &'static str {
    "pong"
}
