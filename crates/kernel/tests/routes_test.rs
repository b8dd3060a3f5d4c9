#![allow(clippy::unwrap_used, clippy::expect_used)]
//! Router-level tests.
//!
//! The search path runs end to end against a recording backend; relational
//! routes are exercised up to request validation.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{MockSearchBackend, TestApp, body_json, body_string, uri};
use storefront_test_utils::{product_hits, search_response, test_product};

fn app_with(body: serde_json::Value) -> TestApp {
    TestApp::new(MockSearchBackend::returning(body))
}

#[tokio::test]
async fn ping_returns_pong() {
    let app = app_with(json!({}));
    let response = app.get("/status/ping").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_string(response).await, "pong");
}

#[tokio::test]
async fn products_listing_uses_search_index() {
    let app = app_with(product_hits(&[
        test_product(1, "Essence Mascara").with_category("beauty"),
        test_product(2, "Eyeshadow Palette").with_category("beauty"),
    ]));

    let response = app
        .get(&uri(
            "/products",
            &[
                ("select", r#"["id","title","category"]"#),
                ("search", r#"[{"column":"category","value":"beauty"}]"#),
                ("pageSize", "2"),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["total"], 2);
    assert_eq!(body["page"], 1);
    assert_eq!(body["pageSize"], 2);
    assert_eq!(body["totalPages"], 1);
    assert_eq!(body["data"][0]["title"], "Essence Mascara");

    let sent = app.backend.last_body();
    assert_eq!(sent["_source"], json!(["id", "title", "category"]));
    assert_eq!(
        sent["query"]["bool"]["must"][0]["match"]["category"],
        json!({"query": "beauty", "operator": "and"})
    );
    assert_eq!(sent["size"], 2);
}

#[tokio::test]
async fn products_default_select() {
    let app = app_with(search_response(json!(0), &[]));
    let response = app.get("/products").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(app.backend.last_body()["_source"], json!(["id", "title"]));
    let body = body_json(response).await;
    assert_eq!(body["totalPages"], 0);
}

#[tokio::test]
async fn page_size_above_maximum_is_bad_request() {
    let app = app_with(json!({}));
    let response = app.get("/products?pageSize=500").await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(
        body["error"],
        r#"pageSize parameter value "500" is greater than the allowed maximum (100)"#
    );
    assert!(app.backend.requests().is_empty());
}

#[tokio::test]
async fn malformed_search_json_is_bad_request() {
    let app = app_with(json!({}));
    let response = app.get(&uri("/products", &[("search", "[{")])).await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_column_is_bad_request() {
    let app = app_with(json!({}));
    let response = app
        .get(&uri("/categories", &[("orderBy", r#"[{"column":"slug","direction":"asc"}]"#)]))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "category: unknown orderBy column 'slug'");
}

#[tokio::test]
async fn wrong_operation_for_column_is_bad_request() {
    let app = app_with(json!({}));
    let response = app
        .get(&uri(
            "/products/from-main-database",
            &[("search", r#"[{"column":"price","operation":"like","value":"10"}]"#)],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn product_id_must_be_positive_integer() {
    let app = app_with(json!({}));

    let response = app.get("/products/abc").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(
        body_json(response).await["error"],
        r#"id parameter is not a valid number: "abc""#
    );

    let response = app.get("/products/0").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = app.get("/products/2.5").await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn search_backend_failure_is_internal_error() {
    let app = TestApp::new(MockSearchBackend::failing(503));
    let response = app.get("/products").await;

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body_json(response).await["error"], "internal server error");
}

#[tokio::test]
async fn health_reports_unreachable_database() {
    let app = app_with(json!({}));
    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "unhealthy");
    assert_eq!(body["postgres"], false);
    assert_eq!(body["search"], true);
}
