//! Request DTOs
//!
//! Data structures for API request bodies and query strings. Browser clients
//! send coordinates and ids either as JSON numbers or as strings, so those
//! fields are accepted in both forms.

use serde::Deserialize;
use validator::Validate;

use crate::application::services::SpeedSubmission;
use crate::domain::Reading;

/// A number that may arrive as a JSON number or as numeric text
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Number(f64),
    Text(String),
}

impl LooseNumber {
    /// Finite floating point value, if any
    pub fn as_f64(&self) -> Option<f64> {
        let value = match self {
            LooseNumber::Number(n) => *n,
            LooseNumber::Text(s) => s.trim().parse().ok()?,
        };
        value.is_finite().then_some(value)
    }

    /// Whole-number value, if any
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            LooseNumber::Number(n) if n.fract() == 0.0 && n.abs() < i64::MAX as f64 => Some(*n as i64),
            LooseNumber::Number(_) => None,
            LooseNumber::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Names of required fields that are absent
fn missing<'a>(fields: &[(&'a str, bool)]) -> Vec<&'a str> {
    fields
        .iter()
        .filter(|(_, present)| !present)
        .map(|(name, _)| *name)
        .collect()
}

/// `?session_id=` query parameter
#[derive(Debug, Deserialize, Validate)]
pub struct SessionQuery {
    #[validate(length(max = 256, message = "session_id must be at most 256 characters"))]
    pub session_id: Option<String>,
}

/// Live location update from a client
#[derive(Debug, Deserialize, Validate)]
pub struct LiveLocationRequest {
    pub latitude: Option<LooseNumber>,
    pub longitude: Option<LooseNumber>,

    #[validate(length(max = 256, message = "session_id must be at most 256 characters"))]
    pub session_id: Option<String>,
}

impl LiveLocationRequest {
    pub fn missing_fields(&self) -> Vec<&'static str> {
        missing(&[
            ("latitude", self.latitude.is_some()),
            ("longitude", self.longitude.is_some()),
            ("session_id", self.session_id.is_some()),
        ])
    }
}

/// Location to persist under a test id
#[derive(Debug, Deserialize, Validate)]
pub struct SaveLocationRequest {
    pub latitude: Option<LooseNumber>,
    pub longitude: Option<LooseNumber>,

    /// Test id linking the location to a speed test
    pub id: Option<LooseNumber>,

    #[validate(length(max = 256, message = "session_id must be at most 256 characters"))]
    pub session_id: Option<String>,
}

/// Speed results reported by the browser test client
#[derive(Debug, Deserialize, Validate)]
pub struct SpeedSubmissionRequest {
    #[serde(rename = "dlStatus")]
    pub dl_status: Option<Reading>,

    #[serde(rename = "ulStatus")]
    pub ul_status: Option<Reading>,

    #[serde(rename = "pingStatus")]
    pub ping_status: Option<Reading>,

    #[validate(length(max = 256, message = "session_id must be at most 256 characters"))]
    pub session_id: Option<String>,
}

impl SpeedSubmissionRequest {
    pub fn submission(&self) -> SpeedSubmission {
        SpeedSubmission {
            download: self.dl_status.clone(),
            upload: self.ul_status.clone(),
            ping: self.ping_status.clone(),
        }
    }
}

/// Final results posted by the browser test client
#[derive(Debug, Deserialize)]
pub struct TelemetryRequest {
    pub download: Option<LooseNumber>,
    pub upload: Option<LooseNumber>,
    pub ping: Option<LooseNumber>,
    pub jitter: Option<LooseNumber>,
}

/// Parsed telemetry values
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Telemetry {
    pub download: f64,
    pub upload: f64,
    pub ping: f64,
    pub jitter: f64,
}

impl TelemetryRequest {
    /// All four values, or `None` if any is missing or not a number
    pub fn parse(&self) -> Option<Telemetry> {
        let value = |field: &Option<LooseNumber>| field.as_ref().and_then(LooseNumber::as_f64);
        Some(Telemetry {
            download: value(&self.download)?,
            upload: value(&self.upload)?,
            ping: value(&self.ping)?,
            jitter: value(&self.jitter)?,
        })
    }
}

/// Query parameters shared by the speed-test backend endpoints
#[derive(Debug, Default, Deserialize)]
pub struct BackendQuery {
    /// Present (any value) when the client asks for permissive CORS headers
    pub cors: Option<String>,
}

/// `?ckSize=` for the download payload
#[derive(Debug, Default, Deserialize)]
pub struct GarbageQuery {
    #[serde(rename = "ckSize")]
    pub ck_size: Option<String>,

    pub cors: Option<String>,
}

impl GarbageQuery {
    pub const DEFAULT_CHUNKS: usize = 4;
    pub const MAX_CHUNKS: usize = 1024;

    /// Requested chunk count clamped to `1..=1024`; unparseable input falls
    /// back to the default.
    pub fn chunks(&self) -> usize {
        match self.ck_size.as_deref().map(|s| s.trim().parse::<i64>()) {
            Some(Ok(n)) => n.clamp(1, Self::MAX_CHUNKS as i64) as usize,
            _ => Self::DEFAULT_CHUNKS,
        }
    }
}
