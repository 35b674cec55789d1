//! Repository Implementations
//!
//! Implementations of the domain [`RecordStore`](crate::domain::RecordStore)
//! trait.
//!
//! - **PgRecordStore** - PostgreSQL tables `locations` and `speed_tests`
//! - **InMemoryRecordStore** - process memory, for running without a database
//!
//! ## Usage Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use speedmap::domain::RecordStore;
//! use speedmap::infrastructure::repositories::PgRecordStore;
//!
//! let store: Arc<dyn RecordStore> = Arc::new(PgRecordStore::new(pool));
//! ```

pub mod memory_record_store;
pub mod pg_record_store;

pub use memory_record_store::InMemoryRecordStore;
pub use pg_record_store::PgRecordStore;
