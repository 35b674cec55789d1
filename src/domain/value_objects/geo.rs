//! Geographic bounds, canvas dimensions and pixel positions.

use serde::{Deserialize, Serialize};

/// Tolerance used for every floating-point comparison against the bounds.
pub const GEO_EPSILON: f64 = 1e-9;

/// Fixed rectangular geographic area covered by the map image.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl GeoBounds {
    pub const fn new(min_lat: f64, max_lat: f64, min_lon: f64, max_lon: f64) -> Self {
        Self {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        }
    }

    /// Whether either axis has collapsed to (nearly) zero extent.
    pub fn is_degenerate(&self) -> bool {
        (self.max_lat - self.min_lat).abs() < GEO_EPSILON
            || (self.max_lon - self.min_lon).abs() < GEO_EPSILON
    }

    /// Inclusive containment check, widened by [`GEO_EPSILON`] on every side.
    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat - GEO_EPSILON..=self.max_lat + GEO_EPSILON).contains(&lat)
            && (self.min_lon - GEO_EPSILON..=self.max_lon + GEO_EPSILON).contains(&lon)
    }
}

/// Pixel dimensions of the map image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: u32,
    pub height: u32,
}

impl CanvasSize {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

/// A position on the canvas, already clamped to its edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
    /// False when the source coordinate lies outside the bounds and the
    /// position was pulled onto the nearest edge.
    pub in_bounds: bool,
}
