//! # Speedmap Library
//!
//! This crate provides the backend of a campus speed-test map:
//! - Live session tracking with periodic eviction of idle clients
//! - Mapping of geographic coordinates onto a fixed map image
//! - Heatmap aggregation over persisted speed tests
//! - The endpoints used by the browser speed test
//! - PostgreSQL or in-memory storage of measurements
//!
//! ## Architecture
//!
//! The crate follows Clean Architecture principles:
//!
//! - **Domain Layer**: Map geometry, records, collaborator traits
//! - **Application Layer**: Tracking service and DTOs
//! - **Infrastructure Layer**: Tracker stores, record stores, speed-test CLI, metrics
//! - **Presentation Layer**: HTTP routes, handlers and middleware
//!
//! ## Module Structure
//!
//! ```text
//! speedmap/
//! +-- config/         Configuration management
//! +-- domain/         Entities, value objects, mapping and aggregation
//! +-- application/    Tracking service and DTOs
//! +-- infrastructure/ Tracker, database, record stores, speed test, metrics
//! +-- presentation/   HTTP routes and middleware
//! +-- shared/         Common utilities (errors, validation)
//! ```

// Configuration module
pub mod config;

// Domain layer - Core business logic
pub mod domain;

// Application layer - Business services
pub mod application;

// Infrastructure layer - External implementations
pub mod infrastructure;

// Presentation layer - HTTP handlers
pub mod presentation;

// Shared utilities
pub mod shared;

// Application startup and state management
pub mod startup;

// Telemetry and observability
pub mod telemetry;
