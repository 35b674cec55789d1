//! Tracking Handlers
//!
//! Test id allocation, live locations and persisted measurements.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use validator::Validate;

use crate::application::dto::request::{
    LiveLocationRequest, LooseNumber, SaveLocationRequest, SessionQuery, SpeedSubmissionRequest,
};
use crate::application::dto::response::{
    GeneratedIdResponse, LivePositionResponse, LocationUpdatedResponse, SavedResponse,
    SessionLocationResponse,
};
use crate::application::services::{TrackingError, TrackingService};
use crate::domain::TestId;
use crate::presentation::http::extractors::AppJson;
use crate::shared::error::AppError;
use crate::shared::validation::validation_error;
use crate::startup::AppState;

fn coordinate(value: Option<&LooseNumber>) -> Result<f64, AppError> {
    value
        .and_then(LooseNumber::as_f64)
        .ok_or_else(|| AppError::BadRequest("Invalid lat/lon format".into()))
}

/// Allocate a test id for a session
pub async fn generate_unique_id(
    State(state): State<AppState>,
    Query(query): Query<SessionQuery>,
) -> Result<Json<GeneratedIdResponse>, AppError> {
    query.validate().map_err(validation_error)?;

    let session_id = query
        .session_id
        .ok_or_else(|| AppError::BadRequest("Missing session_id parameter".into()))?;

    let test_id = state.tracking().generate_test_id(&session_id)?;

    Ok(Json(GeneratedIdResponse {
        id: test_id.as_i64(),
    }))
}

/// Record the current position of a live session
pub async fn save_user_location(
    State(state): State<AppState>,
    AppJson(body): AppJson<LiveLocationRequest>,
) -> Result<Json<LocationUpdatedResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let missing = body.missing_fields();
    if !missing.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Missing required fields: {}",
            missing.join(", ")
        )));
    }

    let latitude = coordinate(body.latitude.as_ref())?;
    let longitude = coordinate(body.longitude.as_ref())?;
    let session_id = body.session_id.unwrap_or_default();

    state
        .tracking()
        .update_live_location(&session_id, latitude, longitude)?;

    Ok(Json(LocationUpdatedResponse {
        status: "User location updated",
        session_id,
    }))
}

/// Persist a location under the test id it belongs to
pub async fn save_location(
    State(state): State<AppState>,
    AppJson(body): AppJson<SaveLocationRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let raw_id = body
        .id
        .as_ref()
        .ok_or_else(|| AppError::BadRequest("Missing unique test id ('id')".into()))?;
    if body.latitude.is_none() || body.longitude.is_none() {
        return Err(AppError::BadRequest("Missing latitude or longitude".into()));
    }

    let latitude = coordinate(body.latitude.as_ref())?;
    let longitude = coordinate(body.longitude.as_ref())?;
    let test_id = raw_id
        .as_i64()
        .map(TestId::new)
        .ok_or_else(|| AppError::BadRequest("Invalid data format: id".into()))?;

    let saved = state
        .tracking()
        .save_location(latitude, longitude, test_id)
        .await?;

    Ok(Json(SavedResponse::new("Location saved successfully!", saved)))
}

/// Persist client-reported speed results
pub async fn submit_speed(
    State(state): State<AppState>,
    AppJson(body): AppJson<SpeedSubmissionRequest>,
) -> Result<Json<SavedResponse>, AppError> {
    body.validate().map_err(validation_error)?;

    let session_id = body
        .session_id
        .as_deref()
        .filter(|s| !s.is_empty())
        .ok_or_else(|| AppError::BadRequest("Missing session_id".into()))?;

    let test_id = state
        .tracking()
        .submit_speed(session_id, body.submission())
        .await?;

    Ok(Json(SavedResponse::new("Speed test results saved!", test_id)))
}

/// Canvas position of a live session
pub async fn get_live_location(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<LivePositionResponse> {
    let response = match state.tracking().live_position(&session_id) {
        Ok(pixel) => LivePositionResponse::found(pixel),
        Err(TrackingError::Mapping(e)) => {
            tracing::error!(session_id = %session_id, error = %e, "Live location could not be mapped");
            LivePositionResponse::not_found(LivePositionResponse::MAPPING_FAILED)
        }
        Err(_) => LivePositionResponse::not_found(LivePositionResponse::NO_DATA),
    };

    Json(response)
}

/// Every active session with the time it was last seen
pub async fn get_all_sessions(State(state): State<AppState>) -> Json<BTreeMap<String, String>> {
    Json(state.tracking().active_sessions())
}

/// Raw position of a live session
pub async fn get_location(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionLocationResponse>, AppError> {
    let record = state.tracking().session_location(&session_id)?;
    Ok(Json(SessionLocationResponse::from(record)))
}
