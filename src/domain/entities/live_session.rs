//! Live session entity.
//!
//! The most recent position reported by one client instance. Held only in
//! process memory by the session store and never persisted.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Format used when a last-seen time is shown to operators.
pub const LAST_SEEN_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Latest reported position of a session.
///
/// Always replaced as a whole; readers never see a record with a fresh
/// latitude and a stale longitude.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SessionRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub last_seen: DateTime<Utc>,
}

impl SessionRecord {
    pub fn new(latitude: f64, longitude: f64, last_seen: DateTime<Utc>) -> Self {
        Self {
            latitude,
            longitude,
            last_seen,
        }
    }

    /// A record is usable only while both coordinates are finite numbers.
    pub fn is_well_formed(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }

    /// Whether the session has been silent for strictly longer than `timeout`.
    pub fn is_expired(&self, now: DateTime<Utc>, timeout: chrono::Duration) -> bool {
        now.signed_duration_since(self.last_seen) > timeout
    }

    pub fn last_seen_display(&self) -> String {
        format_last_seen(self.last_seen)
    }
}

pub fn format_last_seen(at: DateTime<Utc>) -> String {
    at.format(LAST_SEEN_FORMAT).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    #[test]
    fn test_expiry_is_strict() {
        let now = Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap();
        let timeout = Duration::seconds(1800);

        let at_limit = SessionRecord::new(43.0, -76.0, now - timeout);
        let past_limit = SessionRecord::new(43.0, -76.0, now - timeout - Duration::seconds(1));

        assert!(!at_limit.is_expired(now, timeout));
        assert!(past_limit.is_expired(now, timeout));
    }

    #[test]
    fn test_well_formed() {
        let now = Utc::now();
        assert!(SessionRecord::new(43.0, -76.0, now).is_well_formed());
        assert!(!SessionRecord::new(f64::NAN, -76.0, now).is_well_formed());
        assert!(!SessionRecord::new(43.0, f64::INFINITY, now).is_well_formed());
    }

    #[test]
    fn test_last_seen_display() {
        let at = Utc.with_ymd_and_hms(2025, 4, 1, 9, 5, 3).unwrap();
        assert_eq!(format_last_seen(at), "2025-04-01 09:05:03 UTC");
    }
}
