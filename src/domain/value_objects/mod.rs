//! # Domain Value Objects
//!
//! Immutable value types that represent domain concepts without identity.
//!
//! ## Value Objects
//!
//! - **GeoBounds / CanvasSize / PixelPoint**: map geometry
//! - **TestId**: correlation id for persisted speed-test rows
//! - **Reading**: a throughput or latency value that may be text or a number

mod geo;
mod reading;
mod test_id;

pub use geo::*;
pub use reading::*;
pub use test_id::*;
