//! Middleware
//!
//! Tower middleware for request processing.

pub mod cors;
pub mod logging;

pub use logging::{create_trace_layer, is_quiet_path, track_requests};
