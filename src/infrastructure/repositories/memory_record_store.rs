//! In-Memory Record Store
//!
//! Keeps persisted rows in process memory. Used when no database URL is
//! configured and by tests; contents are lost on restart.

use async_trait::async_trait;
use parking_lot::Mutex;

use crate::domain::{
    combine_records, CombinedRecords, LocationRecord, Reading, RecordStore, SpeedTestRecord, TestId,
};
use crate::shared::error::AppError;

#[derive(Debug, Default)]
struct Rows {
    locations: Vec<LocationRecord>,
    speed_tests: Vec<SpeedTestRecord>,
}

/// Record store backed by two append-only vectors.
#[derive(Debug, Default)]
pub struct InMemoryRecordStore {
    rows: Mutex<Rows>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a raw speed-test row, bypassing numeric conversion.
    pub fn insert_speed_test(&self, record: SpeedTestRecord) {
        self.rows.lock().speed_tests.push(record);
    }

    /// Insert a raw location row.
    pub fn insert_location(&self, record: LocationRecord) {
        self.rows.lock().locations.push(record);
    }

    pub fn location_count(&self) -> usize {
        self.rows.lock().locations.len()
    }

    pub fn speed_test_count(&self) -> usize {
        self.rows.lock().speed_tests.len()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn save_location(&self, latitude: f64, longitude: f64, test_id: TestId) -> Result<(), AppError> {
        self.insert_location(LocationRecord {
            test_id,
            latitude: latitude.to_string(),
            longitude: longitude.to_string(),
        });
        Ok(())
    }

    async fn save_speed_test(
        &self,
        download: f64,
        upload: f64,
        ping: f64,
        test_id: TestId,
    ) -> Result<(), AppError> {
        self.insert_speed_test(SpeedTestRecord {
            test_id,
            download: Some(Reading::Number(download)),
            upload: Some(Reading::Number(upload)),
            ping: Some(Reading::Number(ping)),
        });
        Ok(())
    }

    async fn get_all_combined(&self) -> Result<CombinedRecords, AppError> {
        let rows = self.rows.lock();
        Ok(combine_records(
            rows.speed_tests.iter().cloned(),
            rows.locations.iter().cloned(),
        ))
    }
}
