//! Route Configuration
//!
//! Configures all HTTP routes for the API. Paths match what the map page and
//! the browser speed test already call.

use axum::{
    middleware,
    response::IntoResponse,
    routing::{get, post},
    Router,
};

use super::handlers;
use crate::infrastructure::metrics;
use crate::presentation::middleware::track_requests;
use crate::startup::AppState;

/// Create the main API router
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .merge(tracking_routes())
        .merge(backend_routes())
        // Health check endpoints
        .route("/health", get(handlers::health::health_check))
        .route("/health/live", get(handlers::health::liveness))
        .route("/health/ready", get(handlers::health::readiness))
        // Prometheus metrics endpoint
        .route("/metrics", get(metrics_handler))
        .layer(middleware::from_fn(track_requests))
        .with_state(state)
}

/// Prometheus metrics endpoint handler
async fn metrics_handler() -> impl IntoResponse {
    let metrics = metrics::gather_metrics();
    (
        [(
            axum::http::header::CONTENT_TYPE,
            "text/plain; version=0.0.4; charset=utf-8",
        )],
        metrics,
    )
}

/// Live sessions, persisted measurements and the heatmap
fn tracking_routes() -> Router<AppState> {
    Router::new()
        .route("/generate_unique_id", get(handlers::tracking::generate_unique_id))
        .route("/save_user_location", post(handlers::tracking::save_user_location))
        .route("/save_location", post(handlers::tracking::save_location))
        .route("/submit-speed", post(handlers::tracking::submit_speed))
        .route(
            "/get-live-location/{session_id}",
            get(handlers::tracking::get_live_location),
        )
        .route("/get_all_sessions", get(handlers::tracking::get_all_sessions))
        .route("/get_location/{session_id}", get(handlers::tracking::get_location))
        .route("/heatmap-data", get(handlers::heatmap::heatmap_data))
        .route("/speed_test", post(handlers::speed_test::run_speed_test))
}

/// Endpoints used by the browser speed test
fn backend_routes() -> Router<AppState> {
    Router::new()
        .route("/backend/getIP", get(handlers::backend::get_ip))
        .route(
            "/backend/empty",
            get(handlers::backend::empty).post(handlers::backend::empty),
        )
        .route("/backend/garbage", get(handlers::backend::garbage))
        .route("/results/telemetry", post(handlers::backend::telemetry))
}
