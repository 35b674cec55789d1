//! Common Test Utilities
//!
//! Shared helpers, fixtures, and test infrastructure.

use std::sync::Arc;

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body, Bytes},
    http::{Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use speedmap::config::Settings;
use speedmap::domain::{SpeedTestError, SpeedTestResult, SpeedTestRunner};
use speedmap::infrastructure::repositories::InMemoryRecordStore;
use speedmap::startup::{build_router, AppState};

/// Result every server-side speed test reports in tests
pub const FIXED_RESULT: SpeedTestResult = SpeedTestResult {
    download_mbps: 87.654,
    upload_mbps: 12.3,
    ping_ms: 14.2,
};

/// Speed-test runner that never touches the network
pub struct FixedRunner;

#[async_trait]
impl SpeedTestRunner for FixedRunner {
    async fn run(&self) -> Result<SpeedTestResult, SpeedTestError> {
        Ok(FIXED_RESULT)
    }
}

/// Test application builder
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub records: Arc<InMemoryRecordStore>,
}

impl TestApp {
    /// Full router over an in-memory record store and a fixed speed-test runner
    pub async fn new() -> Self {
        let settings = Settings::from_defaults().expect("default settings are valid");
        let records = Arc::new(InMemoryRecordStore::new());
        let state = AppState::new(settings, records.clone(), Arc::new(FixedRunner));

        Self {
            router: build_router(state.clone()),
            state,
            records,
        }
    }

    /// Send a request to the application
    pub async fn request(&self, request: Request<Body>) -> Response {
        self.router.clone().oneshot(request).await.unwrap()
    }

    /// Make a GET request to the application
    pub async fn get(&self, uri: &str) -> Response {
        self.request(
            Request::builder()
                .method("GET")
                .uri(uri)
                .body(Body::empty())
                .unwrap(),
        )
        .await
    }

    /// Make a POST request with JSON body
    pub async fn post_json(&self, uri: &str, body: Value) -> Response {
        self.request(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    /// Allocate a test id for `session_id` through the API
    pub async fn generate_id(&self, session_id: &str) -> i64 {
        let response = self
            .get(&format!("/generate_unique_id?session_id={session_id}"))
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await["id"].as_i64().unwrap()
    }

    /// Report a live location through the API
    pub async fn report_location(&self, session_id: &str, latitude: f64, longitude: f64) {
        let response = self
            .post_json(
                "/save_user_location",
                serde_json::json!({
                    "latitude": latitude,
                    "longitude": longitude,
                    "session_id": session_id,
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}

/// Read the whole response body
pub async fn body_bytes(response: Response) -> Bytes {
    to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

/// Read the response body as JSON
pub async fn body_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Session id that no other test uses
pub fn unique_session() -> String {
    format!("session-{}", uuid::Uuid::new_v4())
}
