//! Live Session Tracker
//!
//! Process-memory state shared by the request handlers:
//!
//! - [`SessionStore`]: session id to latest position
//! - [`IdAllocator`]: session id to generated test id
//! - [`CleanupScheduler`]: background eviction of inactive sessions
//!
//! The two maps have independent locks. Nothing here survives a restart.

mod cleanup;
mod id_allocator;
mod session_store;

pub use cleanup::{CleanupHandle, CleanupScheduler, SweepReport};
pub use id_allocator::IdAllocator;
pub use session_store::SessionStore;
