//! Heatmap Handler

use axum::{extract::State, Json};

use crate::application::services::TrackingService;
use crate::domain::Heatmap;
use crate::shared::error::AppError;
use crate::startup::AppState;

/// Download speeds of every located speed test, in canvas pixels
pub async fn heatmap_data(State(state): State<AppState>) -> Result<Json<Heatmap>, AppError> {
    let heatmap = state.tracking().heatmap().await?;
    Ok(Json(heatmap))
}
