//! Heatmap aggregation over persisted speed tests.

use serde::Serialize;

use super::coordinate_mapper::CoordinateMapper;
use crate::domain::entities::CombinedRecords;
use crate::domain::value_objects::reading_or_zero;

/// Normalisation maximum reported when nothing positive was observed.
pub const FALLBACK_MAX: f64 = 1.0;

/// One rendered point: a pixel plus the download speed measured there.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct HeatmapPoint {
    pub x: u32,
    pub y: u32,
    pub value: f64,
}

/// Points for a single response and the maximum used to scale intensity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Heatmap {
    pub max: f64,
    #[serde(rename = "data")]
    pub points: Vec<HeatmapPoint>,
}

impl Heatmap {
    pub fn empty() -> Self {
        Self {
            max: FALLBACK_MAX,
            points: Vec::new(),
        }
    }
}

/// Build heatmap points from a snapshot of persisted records.
///
/// Records without a location, or whose location cannot be mapped, are
/// skipped. A missing or unusable download value counts as zero rather than
/// dropping the record. `max` never drops to zero or below so that callers
/// can divide by it.
pub fn aggregate(records: &CombinedRecords, mapper: &CoordinateMapper) -> Heatmap {
    let mut points = Vec::with_capacity(records.len());
    let mut max_speed = 0.0_f64;

    for (test_id, record) in records {
        let Some(location) = &record.location else {
            continue;
        };

        let pixel = match mapper.map_raw(&location.latitude, &location.longitude) {
            Ok(pixel) => pixel,
            Err(e) => {
                tracing::debug!(test_id = %test_id, error = %e, "Skipping unmappable record");
                continue;
            }
        };

        let speed = reading_or_zero(record.download.as_ref());
        max_speed = max_speed.max(speed);
        points.push(HeatmapPoint {
            x: pixel.x,
            y: pixel.y,
            value: speed,
        });
    }

    let max = if points.is_empty() || max_speed <= 0.0 {
        FALLBACK_MAX
    } else {
        max_speed
    };

    Heatmap { max, points }
}
