//! HTTP Handlers
//!
//! Request handlers for all HTTP endpoints.

pub mod backend;
pub mod health;
pub mod heatmap;
pub mod tracking;
