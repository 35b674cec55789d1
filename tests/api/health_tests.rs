//! Health Check API Tests

use axum::http::StatusCode;
use pretty_assertions::assert_eq;

use crate::common::{body_bytes, body_json, unique_session, TestApp};

/// Test basic health check endpoint returns 200 OK
#[tokio::test]
async fn test_health_check_returns_ok() {
    let app = TestApp::new().await;

    let response = app.get("/health").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "healthy");
    assert!(body.get("version").is_some());
}

/// Test liveness probe endpoint
#[tokio::test]
async fn test_liveness_probe() {
    let app = TestApp::new().await;

    let response = app.get("/health/live").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["status"], "alive");
}

/// Readiness reports the record store and tracker sizes
#[tokio::test]
async fn test_readiness_probe() {
    let app = TestApp::new().await;
    app.report_location(&unique_session(), 43.0376, -76.1325).await;

    let response = app.get("/health/ready").await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["checks"]["record_store"]["status"], "healthy");
    assert_eq!(body["checks"]["tracker"]["tracked_sessions"], 1);
    assert_eq!(body["checks"]["tracker"]["test_ids"], 0);
}

/// Metrics are exposed in the Prometheus text format
#[tokio::test]
async fn test_metrics_endpoint() {
    let app = TestApp::new().await;
    app.get("/health").await;

    let response = app.get("/metrics").await;

    assert_eq!(response.status(), StatusCode::OK);
    let text = String::from_utf8(body_bytes(response).await.to_vec()).unwrap();
    assert!(text.contains("speedmap_http_requests_total"));
}
