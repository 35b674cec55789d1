//! Geographic to pixel coordinate mapping.
//!
//! The map image is rotated against the compass: latitude runs along the
//! image width (north at `x = 0`) and longitude runs along the image height
//! (east at `y = 0`).

use crate::domain::value_objects::{CanvasSize, GeoBounds, PixelPoint};

/// Bounds of the deployment site used when nothing else is configured.
pub const DEFAULT_BOUNDS: GeoBounds = GeoBounds::new(43.037278, 43.037944, -76.132944, -76.132194);

/// Size of the deployment map image used when nothing else is configured.
pub const DEFAULT_CANVAS: CanvasSize = CanvasSize::new(1003, 800);

/// Reasons a coordinate cannot be placed on the canvas.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum MapError {
    #[error("Invalid coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("Map bounds are degenerate (min and max coincide)")]
    DegenerateBounds,
}

/// Maps coordinates onto a fixed canvas. Pure and cheap to copy.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoordinateMapper {
    bounds: GeoBounds,
    canvas: CanvasSize,
}

impl Default for CoordinateMapper {
    fn default() -> Self {
        Self::new(DEFAULT_BOUNDS, DEFAULT_CANVAS)
    }
}

impl CoordinateMapper {
    pub fn new(bounds: GeoBounds, canvas: CanvasSize) -> Self {
        Self { bounds, canvas }
    }

    pub fn bounds(&self) -> GeoBounds {
        self.bounds
    }

    pub fn canvas(&self) -> CanvasSize {
        self.canvas
    }

    /// Map a coordinate to a pixel.
    ///
    /// Out-of-bounds input still yields a position, clamped to the nearest
    /// canvas edge, with `in_bounds` set to false. Only non-finite input and
    /// degenerate bounds fail.
    pub fn map_to_pixel(&self, lat: f64, lon: f64) -> Result<PixelPoint, MapError> {
        if !lat.is_finite() || !lon.is_finite() {
            return Err(MapError::InvalidCoordinate(format!("({lat}, {lon})")));
        }
        if self.bounds.is_degenerate() {
            return Err(MapError::DegenerateBounds);
        }

        let GeoBounds {
            min_lat,
            max_lat,
            min_lon,
            max_lon,
        } = self.bounds;

        let x = (max_lat - lat) / (max_lat - min_lat) * f64::from(self.canvas.width);
        let y = (max_lon - lon) / (max_lon - min_lon) * f64::from(self.canvas.height);

        Ok(PixelPoint {
            x: clamp_to_axis(x, self.canvas.width),
            y: clamp_to_axis(y, self.canvas.height),
            in_bounds: self.bounds.contains(lat, lon),
        })
    }

    /// Parse textual coordinates and map them.
    pub fn map_raw(&self, lat: &str, lon: &str) -> Result<PixelPoint, MapError> {
        let lat = parse_coordinate(lat)?;
        let lon = parse_coordinate(lon)?;
        self.map_to_pixel(lat, lon)
    }
}

/// Parse a decimal-degree value. Surrounding whitespace is ignored.
pub fn parse_coordinate(raw: &str) -> Result<f64, MapError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| MapError::InvalidCoordinate(raw.to_string()))
}

fn clamp_to_axis(value: f64, dimension: u32) -> u32 {
    let upper = f64::from(dimension.saturating_sub(1));
    value.clamp(0.0, upper) as u32
}
