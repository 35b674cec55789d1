//! PostgreSQL Record Store
//!
//! Persists location reports and speed-test results in the `locations` and
//! `speed_tests` tables and joins them on `test_id` when read back.

use async_trait::async_trait;
use sqlx::PgPool;

use crate::domain::{
    combine_records, CombinedRecords, LocationRecord, Reading, RecordStore, SpeedTestRecord, TestId,
};
use crate::shared::error::AppError;

/// Database row of the `speed_tests` table.
#[derive(Debug, sqlx::FromRow)]
struct SpeedTestRow {
    test_id: i64,
    download: Option<f64>,
    upload: Option<f64>,
    ping: Option<f64>,
}

impl SpeedTestRow {
    fn into_record(self) -> SpeedTestRecord {
        SpeedTestRecord {
            test_id: TestId(self.test_id),
            download: self.download.map(Reading::Number),
            upload: self.upload.map(Reading::Number),
            ping: self.ping.map(Reading::Number),
        }
    }
}

/// Database row of the `locations` table.
#[derive(Debug, sqlx::FromRow)]
struct LocationRow {
    test_id: i64,
    latitude: String,
    longitude: String,
}

impl LocationRow {
    fn into_record(self) -> LocationRecord {
        LocationRecord {
            test_id: TestId(self.test_id),
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// PostgreSQL record store implementation.
#[derive(Clone)]
pub struct PgRecordStore {
    pool: PgPool,
}

impl PgRecordStore {
    /// Create a new PgRecordStore with the given connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn save_location(&self, latitude: f64, longitude: f64, test_id: TestId) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO locations (test_id, latitude, longitude)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(test_id.as_i64())
        .bind(latitude.to_string())
        .bind(longitude.to_string())
        .execute(&self.pool)
        .await?;

        tracing::debug!(%test_id, latitude, longitude, "Saved location");
        Ok(())
    }

    async fn save_speed_test(
        &self,
        download: f64,
        upload: f64,
        ping: f64,
        test_id: TestId,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO speed_tests (test_id, download, upload, ping)
            VALUES ($1, $2, $3, $4)
            "#,
        )
        .bind(test_id.as_i64())
        .bind(download)
        .bind(upload)
        .bind(ping)
        .execute(&self.pool)
        .await?;

        tracing::debug!(%test_id, download, upload, ping, "Saved speed test");
        Ok(())
    }

    async fn get_all_combined(&self) -> Result<CombinedRecords, AppError> {
        // Ascending id order so the newest row per test_id wins the join.
        let speed_tests = sqlx::query_as::<_, SpeedTestRow>(
            r#"
            SELECT test_id, download, upload, ping
            FROM speed_tests
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        let locations = sqlx::query_as::<_, LocationRow>(
            r#"
            SELECT test_id, latitude, longitude
            FROM locations
            ORDER BY id ASC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(combine_records(
            speed_tests.into_iter().map(SpeedTestRow::into_record),
            locations.into_iter().map(LocationRow::into_record),
        ))
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
