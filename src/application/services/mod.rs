//! Application Services
//!
//! Business logic services that coordinate domain operations.
//!
//! ## Available Services
//!
//! - **TrackingService**: live sessions, test ids, record persistence,
//!   heatmap and server-side speed tests

pub mod tracking_service;

pub use tracking_service::{
    SpeedSubmission, SpeedTestOutcome, TrackingError, TrackingService, TrackingServiceImpl,
    MAX_SESSION_ID_LEN,
};
