//! Persisted speed-test and location records and the store that owns them.
//!
//! Rows are keyed by [`TestId`]. A location row and a speed-test row written
//! under the same id describe one measurement; [`combine_records`] joins them
//! the way every store implementation reports them.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::value_objects::{Reading, TestId};
use crate::shared::error::AppError;

/// A persisted location row. Coordinates are stored as text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationRecord {
    pub test_id: TestId,
    pub latitude: String,
    pub longitude: String,
}

/// A persisted speed-test row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeedTestRecord {
    pub test_id: TestId,
    pub download: Option<Reading>,
    pub upload: Option<Reading>,
    pub ping: Option<Reading>,
}

/// Location part of a [`CombinedRecord`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordLocation {
    pub latitude: String,
    pub longitude: String,
}

/// One speed test together with the location reported for the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinedRecord {
    pub download: Option<Reading>,
    pub upload: Option<Reading>,
    pub ping: Option<Reading>,
    pub location: Option<RecordLocation>,
}

/// Snapshot of every speed test keyed by its id.
pub type CombinedRecords = BTreeMap<TestId, CombinedRecord>;

/// Join speed-test rows with location rows.
///
/// Only ids with a speed test appear in the result. When an id has several
/// rows of the same kind, the last one in iteration order wins. Locations
/// whose id has no speed test are dropped.
pub fn combine_records<S, L>(speed_tests: S, locations: L) -> CombinedRecords
where
    S: IntoIterator<Item = SpeedTestRecord>,
    L: IntoIterator<Item = LocationRecord>,
{
    let mut combined: CombinedRecords = speed_tests
        .into_iter()
        .map(|row| {
            (
                row.test_id,
                CombinedRecord {
                    download: row.download,
                    upload: row.upload,
                    ping: row.ping,
                    location: None,
                },
            )
        })
        .collect();

    for row in locations {
        if let Some(entry) = combined.get_mut(&row.test_id) {
            entry.location = Some(RecordLocation {
                latitude: row.latitude,
                longitude: row.longitude,
            });
        }
    }

    combined
}

/// Durable storage for locations and speed tests.
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Persist a location under `test_id`.
    async fn save_location(&self, latitude: f64, longitude: f64, test_id: TestId) -> Result<(), AppError>;

    /// Persist speed-test results under `test_id`.
    async fn save_speed_test(
        &self,
        download: f64,
        upload: f64,
        ping: f64,
        test_id: TestId,
    ) -> Result<(), AppError>;

    /// All speed tests joined with their locations.
    async fn get_all_combined(&self) -> Result<CombinedRecords, AppError>;

    /// Cheap connectivity probe used by the readiness check.
    async fn ping(&self) -> Result<(), AppError> {
        Ok(())
    }
}
