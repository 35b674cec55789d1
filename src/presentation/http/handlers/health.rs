//! Health Check Handlers
//!
//! # Endpoints
//! - `GET /health` - Basic health check
//! - `GET /health/live` - Liveness probe (is the process serving requests?)
//! - `GET /health/ready` - Readiness probe (is the record store reachable?)

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::time::Instant;

use crate::startup::AppState;

/// Server start time for uptime calculation
static SERVER_START: Lazy<Instant> = Lazy::new(Instant::now);
static SERVER_START_TIME: Lazy<DateTime<Utc>> = Lazy::new(Utc::now);

/// Store round trips slower than this mark the service as degraded.
const SLOW_STORE_MS: u64 = 100;

/// Pin the start time (call during startup)
pub fn init_server_start() {
    Lazy::force(&SERVER_START);
    Lazy::force(&SERVER_START_TIME);
}

/// Overall or per-dependency health
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
    Unhealthy,
}

/// Basic health response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

/// Simple liveness response
#[derive(Debug, Serialize)]
pub struct LivenessResponse {
    pub status: &'static str,
}

/// Readiness response
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: HealthStatus,
    pub version: &'static str,
    pub environment: String,
    pub uptime_seconds: u64,
    pub started_at: String,
    pub checks: ReadinessChecks,
}

#[derive(Debug, Serialize)]
pub struct ReadinessChecks {
    pub record_store: StoreHealth,
    pub tracker: TrackerHealth,
}

/// Record store reachability
#[derive(Debug, Serialize)]
pub struct StoreHealth {
    pub status: HealthStatus,
    /// `postgres` or `memory`
    pub backend: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latency_ms: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Sizes of the in-memory tracker maps
#[derive(Debug, Serialize)]
pub struct TrackerHealth {
    pub tracked_sessions: usize,
    pub test_ids: usize,
}

/// Basic health check endpoint
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Liveness probe. Never touches dependencies.
pub async fn liveness() -> Json<LivenessResponse> {
    Json(LivenessResponse { status: "alive" })
}

/// Readiness probe. 503 when the record store cannot be reached.
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    let record_store = check_record_store(&state).await;
    let status = record_store.status;

    let response = ReadinessResponse {
        status,
        version: env!("CARGO_PKG_VERSION"),
        environment: state.settings.environment.clone(),
        uptime_seconds: SERVER_START.elapsed().as_secs(),
        started_at: SERVER_START_TIME.to_rfc3339(),
        checks: ReadinessChecks {
            record_store,
            tracker: TrackerHealth {
                tracked_sessions: state.sessions.len(),
                test_ids: state.ids.len(),
            },
        },
    };

    (status_code(status), Json(response))
}

async fn check_record_store(state: &AppState) -> StoreHealth {
    let backend = if state.settings.database.url.is_some() {
        "postgres"
    } else {
        "memory"
    };

    let start = Instant::now();
    match state.records.ping().await {
        Ok(()) => {
            let latency = start.elapsed().as_millis() as u64;
            StoreHealth {
                status: classify_latency(latency),
                backend,
                latency_ms: Some(latency),
                message: None,
            }
        }
        Err(e) => StoreHealth {
            status: HealthStatus::Unhealthy,
            backend,
            latency_ms: None,
            message: Some(format!("Record store unavailable: {}", e)),
        },
    }
}

fn classify_latency(latency_ms: u64) -> HealthStatus {
    if latency_ms < SLOW_STORE_MS {
        HealthStatus::Healthy
    } else {
        HealthStatus::Degraded
    }
}

fn status_code(status: HealthStatus) -> StatusCode {
    match status {
        HealthStatus::Healthy | HealthStatus::Degraded => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    }
}
