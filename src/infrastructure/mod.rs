//! Infrastructure Layer
//!
//! Contains implementations for external services and process state:
//! - Database pool and record store implementations (PostgreSQL, memory)
//! - Live session tracker (session store, id allocator, cleanup)
//! - Speed test CLI runner
//! - Prometheus metrics

pub mod database;
pub mod metrics;
pub mod repositories;
pub mod speedtest;
pub mod tracker;
