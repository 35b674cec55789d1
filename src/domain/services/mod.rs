//! # Domain Services
//!
//! Pure functions over domain values.
//!
//! ## Services
//!
//! - **CoordinateMapper**: geographic coordinate to canvas pixel
//! - **Heatmap aggregation**: persisted speed tests to renderable points

mod coordinate_mapper;
mod heatmap;

pub use coordinate_mapper::*;
pub use heatmap::*;
