mod common;

use axum::http::StatusCode;
use common::{DownStore, TestApp};
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_healthz_up() {
    let app = TestApp::new();

    let response = app.get("/healthz").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, json!({ "database": { "status": "up" } }));
}

#[tokio::test]
async fn test_healthz_database_down() {
    let app = TestApp::with_store(Arc::new(DownStore));

    let response = app.get("/healthz").await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.body["error"], "database down");
}

#[tokio::test]
async fn test_healthz_needs_no_session() {
    let app = TestApp::new();

    assert_ne!(app.get("/healthz").await.status, StatusCode::UNAUTHORIZED);
}
