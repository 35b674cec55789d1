//! # Domain Entities
//!
//! Core domain entities of the tracker.
//!
//! - **SessionRecord**: latest position of a live client session (memory only)
//! - **CombinedRecord**: a persisted speed test joined with its location
//! - **SpeedTestResult**: output of a server-side speed test
//!
//! ## Collaborator Traits
//!
//! [`RecordStore`] and [`SpeedTestRunner`] define the external systems the
//! tracker consumes. They are implemented in the infrastructure layer.

mod live_session;
mod record;

pub use live_session::{format_last_seen, SessionRecord, LAST_SEEN_FORMAT};

pub use record::{
    combine_records, CombinedRecord, CombinedRecords, LocationRecord, RecordLocation, RecordStore,
    SpeedTestRecord,
};

pub use speed_test::{SpeedTestError, SpeedTestResult, SpeedTestRunner};
