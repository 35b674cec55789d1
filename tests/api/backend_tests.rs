//! Speed-test backend API tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::common::{body_bytes, body_json, TestApp};

const MIB: usize = 1024 * 1024;

#[tokio::test]
async fn test_garbage_streams_requested_chunks() {
    let app = TestApp::new().await;

    let response = app.get("/backend/garbage?ckSize=2").await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/octet-stream"
    );
    assert_eq!(
        response.headers()[header::CONTENT_LENGTH],
        (2 * MIB).to_string().as_str()
    );
    assert_eq!(body_bytes(response).await.len(), 2 * MIB);
}

#[tokio::test]
async fn test_garbage_defaults_to_four_chunks() {
    let app = TestApp::new().await;

    let response = app.get("/backend/garbage?ckSize=bogus").await;

    assert_eq!(body_bytes(response).await.len(), 4 * MIB);
}

#[tokio::test]
async fn test_empty_accepts_upload() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Request::builder()
                .method("POST")
                .uri("/backend/empty?cors")
                .body(Body::from(vec![7u8; 256 * 1024]))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert!(headers[header::CACHE_CONTROL]
        .to_str()
        .unwrap()
        .contains("no-store"));
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn test_get_ip_uses_forwarded_header() {
    let app = TestApp::new().await;

    let response = app
        .request(
            Request::builder()
                .uri("/backend/getIP")
                .header("x-forwarded-for", "203.0.113.50, 10.0.0.2")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["yourIp"], "203.0.113.50");
    assert_eq!(body["processedString"], "203.0.113.50");
    assert_eq!(body["ISP"], serde_json::Value::Null);
}

#[tokio::test]
async fn test_get_ip_without_peer_information() {
    let app = TestApp::new().await;

    let body = body_json(app.get("/backend/getIP").await).await;

    assert_eq!(body["yourIp"], "0.0.0.0");
}

#[tokio::test]
async fn test_telemetry_accepts_numeric_report() {
    let app = TestApp::new().await;

    let response = app
        .post_json(
            "/results/telemetry",
            json!({"download": "91.2", "upload": 11.4, "ping": "15", "jitter": "2.1"}),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, json!({"status": "success"}));
}

#[tokio::test]
async fn test_telemetry_rejects_missing_values() {
    let app = TestApp::new().await;

    let response = app
        .post_json("/results/telemetry", json!({"download": 91.2}))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
