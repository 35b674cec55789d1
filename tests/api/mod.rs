//! HTTP API tests

mod backend_tests;
mod health_tests;
mod heatmap_tests;
mod tracking_tests;
