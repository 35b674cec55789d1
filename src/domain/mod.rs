//! # Domain Layer
//!
//! Core tracker logic, independent of HTTP, storage and process concerns.
//!
//! ## Structure
//!
//! - **entities**: live sessions, persisted records, collaborator traits
//! - **value_objects**: map geometry, correlation ids, readings
//! - **services**: coordinate mapping and heatmap aggregation

pub mod entities;
pub mod services;
pub mod value_objects;

// Re-export commonly used types
pub use entities::*;
pub use services::*;
pub use value_objects::*;
