//! Tracking Service
//!
//! Composes the live session tracker, the record store and the speed-test
//! runner into the operations exposed over HTTP.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;

use crate::domain::{
    aggregate, format_last_seen, reading_or_zero, CoordinateMapper, Heatmap, MapError,
    PixelPoint, Reading, RecordStore, SessionRecord, SpeedTestError, SpeedTestResult,
    SpeedTestRunner, TestId,
};
use crate::infrastructure::metrics;
use crate::infrastructure::tracker::{IdAllocator, SessionStore};
use crate::shared::error::AppError;

/// Longest session id accepted from clients.
pub const MAX_SESSION_ID_LEN: usize = 256;

/// Tracking service trait
#[async_trait]
pub trait TrackingService: Send + Sync {
    /// Allocate a fresh test id for a session, replacing any previous one
    fn generate_test_id(&self, session_id: &str) -> Result<TestId, TrackingError>;

    /// Record the latest position of a live session
    fn update_live_location(
        &self,
        session_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), TrackingError>;

    /// Canvas position of a live session
    fn live_position(&self, session_id: &str) -> Result<PixelPoint, TrackingError>;

    /// Every well-formed live session with its formatted last-seen time
    fn active_sessions(&self) -> BTreeMap<String, String>;

    /// Raw position of a live session
    fn session_location(&self, session_id: &str) -> Result<SessionRecord, TrackingError>;

    /// Persist a location under an explicit test id
    async fn save_location(
        &self,
        latitude: f64,
        longitude: f64,
        test_id: TestId,
    ) -> Result<TestId, TrackingError>;

    /// Persist client-reported speed results under the session's test id
    async fn submit_speed(
        &self,
        session_id: &str,
        submission: SpeedSubmission,
    ) -> Result<TestId, TrackingError>;

    /// Build the heatmap from every persisted record
    async fn heatmap(&self) -> Result<Heatmap, TrackingError>;

    /// Run a speed test from the server and persist it for the session
    async fn run_speed_test(&self, session_id: &str) -> Result<SpeedTestOutcome, TrackingError>;
}

/// Speed values as reported by the browser client
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpeedSubmission {
    pub download: Option<Reading>,
    pub upload: Option<Reading>,
    pub ping: Option<Reading>,
}

/// A completed server-side speed test and the id it was saved under
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpeedTestOutcome {
    pub test_id: TestId,
    pub result: SpeedTestResult,
}

/// Tracking service errors
#[derive(Debug, thiserror::Error)]
pub enum TrackingError {
    #[error("{0}")]
    Validation(String),

    #[error("Session not found: {0}")]
    SessionNotFound(String),

    #[error("No test ID found for session {0}")]
    NoTestId(String),

    #[error("Mapping failed: {0}")]
    Mapping(#[from] MapError),

    #[error("Record store error: {0}")]
    Store(String),

    #[error(transparent)]
    SpeedTest(#[from] SpeedTestError),
}

impl From<TrackingError> for AppError {
    fn from(err: TrackingError) -> Self {
        match err {
            TrackingError::Validation(msg) => AppError::Validation(msg),
            TrackingError::SessionNotFound(_) => {
                AppError::NotFound("Session ID not found or data invalid".into())
            }
            TrackingError::NoTestId(_) => AppError::NoTestId(
                "No test ID found for this session. Please run a test first or refresh.".into(),
            ),
            TrackingError::Mapping(MapError::DegenerateBounds) => {
                AppError::Configuration(MapError::DegenerateBounds.to_string())
            }
            TrackingError::Mapping(e) => AppError::BadRequest(e.to_string()),
            TrackingError::Store(msg) => AppError::Internal(msg),
            TrackingError::SpeedTest(e @ (SpeedTestError::Disabled | SpeedTestError::NotInstalled(_))) => {
                AppError::ServiceUnavailable(e.to_string())
            }
            TrackingError::SpeedTest(e) => AppError::Internal(e.to_string()),
        }
    }
}

/// TrackingService implementation
pub struct TrackingServiceImpl {
    sessions: Arc<SessionStore>,
    ids: Arc<IdAllocator>,
    records: Arc<dyn RecordStore>,
    runner: Arc<dyn SpeedTestRunner>,
    mapper: CoordinateMapper,
}

impl TrackingServiceImpl {
    pub fn new(
        sessions: Arc<SessionStore>,
        ids: Arc<IdAllocator>,
        records: Arc<dyn RecordStore>,
        runner: Arc<dyn SpeedTestRunner>,
        mapper: CoordinateMapper,
    ) -> Self {
        Self {
            sessions,
            ids,
            records,
            runner,
            mapper,
        }
    }
}

fn validate_session_id(session_id: &str) -> Result<(), TrackingError> {
    if session_id.trim().is_empty() {
        return Err(TrackingError::Validation("Missing session_id".into()));
    }
    if session_id.len() > MAX_SESSION_ID_LEN {
        return Err(TrackingError::Validation(format!(
            "session_id must be at most {} bytes",
            MAX_SESSION_ID_LEN
        )));
    }
    Ok(())
}

fn validate_coordinates(latitude: f64, longitude: f64) -> Result<(), TrackingError> {
    if latitude.is_finite() && longitude.is_finite() {
        Ok(())
    } else {
        Err(TrackingError::Validation("Invalid lat/lon format".into()))
    }
}

/// Numeric value of a submitted reading. Anything unusable counts as zero.
fn submitted_value(field: &str, reading: Option<&Reading>) -> f64 {
    if let Some(Reading::Text(raw)) = reading {
        if reading.and_then(Reading::value).is_none()
            && !raw.trim().eq_ignore_ascii_case(crate::domain::FAILURE_MARKER)
        {
            tracing::warn!(field, value = %raw, "Unparseable speed value, storing 0");
        }
    }
    reading_or_zero(reading)
}

#[async_trait]
impl TrackingService for TrackingServiceImpl {
    fn generate_test_id(&self, session_id: &str) -> Result<TestId, TrackingError> {
        validate_session_id(session_id)?;

        let test_id = self.ids.generate(session_id);
        tracing::debug!(session_id, test_id = %test_id, "Generated test id");
        Ok(test_id)
    }

    fn update_live_location(
        &self,
        session_id: &str,
        latitude: f64,
        longitude: f64,
    ) -> Result<(), TrackingError> {
        validate_session_id(session_id)?;
        validate_coordinates(latitude, longitude)?;

        self.sessions.update(session_id, latitude, longitude, Utc::now());
        metrics::set_tracked_sessions(self.sessions.len());
        Ok(())
    }

    fn live_position(&self, session_id: &str) -> Result<PixelPoint, TrackingError> {
        let record = self
            .sessions
            .get(session_id)
            .filter(SessionRecord::is_well_formed)
            .ok_or_else(|| TrackingError::SessionNotFound(session_id.to_string()))?;

        Ok(self.mapper.map_to_pixel(record.latitude, record.longitude)?)
    }

    fn active_sessions(&self) -> BTreeMap<String, String> {
        self.sessions
            .list_with_last_seen()
            .into_iter()
            .map(|(session_id, last_seen)| (session_id, format_last_seen(last_seen)))
            .collect()
    }

    fn session_location(&self, session_id: &str) -> Result<SessionRecord, TrackingError> {
        self.sessions
            .get(session_id)
            .filter(SessionRecord::is_well_formed)
            .ok_or_else(|| TrackingError::SessionNotFound(session_id.to_string()))
    }

    async fn save_location(
        &self,
        latitude: f64,
        longitude: f64,
        test_id: TestId,
    ) -> Result<TestId, TrackingError> {
        validate_coordinates(latitude, longitude)?;

        self.records
            .save_location(latitude, longitude, test_id)
            .await
            .map_err(|e| TrackingError::Store(e.to_string()))?;

        tracing::info!(test_id = %test_id, "Location saved");
        Ok(test_id)
    }

    async fn submit_speed(
        &self,
        session_id: &str,
        submission: SpeedSubmission,
    ) -> Result<TestId, TrackingError> {
        validate_session_id(session_id)?;

        let download = submitted_value("dlStatus", submission.download.as_ref());
        let upload = submitted_value("ulStatus", submission.upload.as_ref());
        let ping = submitted_value("pingStatus", submission.ping.as_ref());

        let test_id = self
            .ids
            .resolve(session_id)
            .ok_or_else(|| TrackingError::NoTestId(session_id.to_string()))?;

        self.records
            .save_speed_test(download, upload, ping, test_id)
            .await
            .map_err(|e| TrackingError::Store(e.to_string()))?;

        tracing::info!(test_id = %test_id, download, upload, ping, "Speed test results saved");
        Ok(test_id)
    }

    async fn heatmap(&self) -> Result<Heatmap, TrackingError> {
        let records = self
            .records
            .get_all_combined()
            .await
            .map_err(|e| TrackingError::Store(e.to_string()))?;

        let heatmap = aggregate(&records, &self.mapper);
        metrics::record_heatmap(heatmap.points.len());

        tracing::debug!(
            records = records.len(),
            points = heatmap.points.len(),
            max = heatmap.max,
            "Heatmap aggregated"
        );
        Ok(heatmap)
    }

    async fn run_speed_test(&self, session_id: &str) -> Result<SpeedTestOutcome, TrackingError> {
        validate_session_id(session_id)?;

        let test_id = match self.ids.resolve(session_id) {
            Some(id) => id,
            None => self.ids.generate(session_id),
        };

        tracing::info!(session_id, test_id = %test_id, "Running server-side speed test");
        let result = self.runner.run().await?;

        self.records
            .save_speed_test(result.download_mbps, result.upload_mbps, result.ping_ms, test_id)
            .await
            .map_err(|e| TrackingError::Store(e.to_string()))?;

        Ok(SpeedTestOutcome { test_id, result })
    }
}
