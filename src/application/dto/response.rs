//! Response DTOs
//!
//! Data structures for API response bodies.

use serde::Serialize;

use crate::application::services::SpeedTestOutcome;
use crate::domain::{PixelPoint, SessionRecord, TestId};

/// Newly generated test id
#[derive(Debug, Serialize)]
pub struct GeneratedIdResponse {
    pub id: i64,
}

/// Acknowledgement of a live location update
#[derive(Debug, Serialize)]
pub struct LocationUpdatedResponse {
    pub status: &'static str,
    pub session_id: String,
}

/// Acknowledgement of a persisted row
#[derive(Debug, Serialize)]
pub struct SavedResponse {
    pub message: &'static str,
    pub id: i64,
}

impl SavedResponse {
    pub fn new(message: &'static str, id: TestId) -> Self {
        Self {
            message,
            id: id.as_i64(),
        }
    }
}

/// Live canvas position of a session.
///
/// Serialized as `{x, y, in_bounds, found: true}` or `{found: false, reason}`.
#[derive(Debug, Serialize)]
pub struct LivePositionResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub in_bounds: Option<bool>,
    pub found: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<&'static str>,
}

impl LivePositionResponse {
    pub const NO_DATA: &'static str = "No recent data for session";
    pub const MAPPING_FAILED: &'static str = "Mapping failed";

    pub fn found(pixel: PixelPoint) -> Self {
        Self {
            x: Some(pixel.x),
            y: Some(pixel.y),
            in_bounds: Some(pixel.in_bounds),
            found: true,
            reason: None,
        }
    }

    pub fn not_found(reason: &'static str) -> Self {
        Self {
            x: None,
            y: None,
            in_bounds: None,
            found: false,
            reason: Some(reason),
        }
    }
}

/// Raw position of a live session
#[derive(Debug, Serialize)]
pub struct SessionLocationResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub last_seen: String,
}

impl From<SessionRecord> for SessionLocationResponse {
    fn from(record: SessionRecord) -> Self {
        Self {
            latitude: record.latitude,
            longitude: record.longitude,
            last_seen: record.last_seen_display(),
        }
    }
}

/// Server-side speed test result, formatted for display
#[derive(Debug, Serialize)]
pub struct SpeedTestResponse {
    pub id: i64,
    pub download: String,
    pub upload: String,
    pub ping: String,
}

impl From<SpeedTestOutcome> for SpeedTestResponse {
    fn from(outcome: SpeedTestOutcome) -> Self {
        Self {
            id: outcome.test_id.as_i64(),
            download: format!("{:.2} Mbps", outcome.result.download_mbps),
            upload: format!("{:.2} Mbps", outcome.result.upload_mbps),
            ping: format!("{:.0} ms", outcome.result.ping_ms),
        }
    }
}

/// Client IP echo in the shape the browser test client expects
#[derive(Debug, Serialize)]
pub struct ClientIpResponse {
    #[serde(rename = "processedString")]
    pub processed_string: String,
    #[serde(rename = "yourIp")]
    pub your_ip: String,
    pub query: String,
    #[serde(rename = "ISP")]
    pub isp: Option<String>,
    #[serde(rename = "rawIspInfo")]
    pub raw_isp_info: String,
}

impl ClientIpResponse {
    pub fn new(ip: String) -> Self {
        Self {
            processed_string: ip.clone(),
            your_ip: ip.clone(),
            query: ip,
            isp: None,
            raw_isp_info: String::new(),
        }
    }
}

/// Simple status acknowledgement
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: &'static str,
}
