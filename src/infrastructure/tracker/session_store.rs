//! Live Session Store
//!
//! In-memory map from client session id to the latest reported position.
//!
//! Every operation takes the single map lock, copies what it needs and
//! releases it before returning. No lock is held across an `.await` and no
//! caller ever gets a reference into the map.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;

use crate::domain::SessionRecord;

/// Process-wide store of live session positions.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: Mutex<HashMap<String, SessionRecord>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the record for `session_id`. Last writer wins.
    pub fn update(&self, session_id: &str, latitude: f64, longitude: f64, now: DateTime<Utc>) {
        let record = SessionRecord::new(latitude, longitude, now);
        self.sessions.lock().insert(session_id.to_owned(), record);
    }

    /// Copy of the current record, if the session is tracked.
    pub fn get(&self, session_id: &str) -> Option<SessionRecord> {
        self.sessions.lock().get(session_id).copied()
    }

    /// Ids tracked at the moment of the call.
    pub fn list_ids(&self) -> Vec<String> {
        self.sessions.lock().keys().cloned().collect()
    }

    /// Last-seen time of every well-formed record.
    pub fn list_with_last_seen(&self) -> HashMap<String, DateTime<Utc>> {
        self.sessions
            .lock()
            .iter()
            .filter(|(_, record)| record.is_well_formed())
            .map(|(id, record)| (id.clone(), record.last_seen))
            .collect()
    }

    /// Drop a session. Removing an unknown id is a no-op.
    pub fn remove(&self, session_id: &str) {
        self.sessions.lock().remove(session_id);
    }

    /// Drop the listed sessions that are ill-formed or silent for longer
    /// than `timeout`, re-checking each under one lock acquisition.
    /// Returns the ids actually removed.
    pub fn remove_expired(
        &self,
        candidates: &[String],
        now: DateTime<Utc>,
        timeout: chrono::Duration,
    ) -> Vec<String> {
        let mut sessions = self.sessions.lock();
        let mut removed = Vec::new();
        for id in candidates {
            let expired = sessions
                .get(id)
                .is_some_and(|record| !record.is_well_formed() || record.is_expired(now, timeout));
            if expired {
                sessions.remove(id);
                removed.push(id.clone());
            }
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.sessions.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::sync::Arc;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 4, 1, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_update_then_get_round_trips() {
        let store = SessionStore::new();
        store.update("abc", 43.0376, -76.1325, t0());

        assert_eq!(
            store.get("abc"),
            Some(SessionRecord::new(43.0376, -76.1325, t0()))
        );
    }

    #[test]
    fn test_get_unknown_is_none() {
        let store = SessionStore::new();
        assert_eq!(store.get("missing"), None);
    }

    #[test]
    fn test_update_overwrites_whole_record() {
        let store = SessionStore::new();
        store.update("abc", 1.0, 2.0, t0());
        let later = t0() + chrono::Duration::seconds(5);
        store.update("abc", 3.0, 4.0, later);

        assert_eq!(store.get("abc"), Some(SessionRecord::new(3.0, 4.0, later)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let store = SessionStore::new();
        store.update("abc", 1.0, 2.0, t0());

        store.remove("abc");
        assert_eq!(store.get("abc"), None);
        store.remove("abc");
        assert!(store.is_empty());
    }

    #[test]
    fn test_list_ids_is_a_snapshot() {
        let store = SessionStore::new();
        store.update("a", 1.0, 2.0, t0());
        store.update("b", 1.0, 2.0, t0());

        let mut ids = store.list_ids();
        store.update("c", 1.0, 2.0, t0());
        ids.sort();

        assert_eq!(ids, vec!["a".to_string(), "b".to_string()]);
    }

    #[test]
    fn test_remove_expired_rechecks_refreshed_sessions() {
        let store = SessionStore::new();
        let timeout = chrono::Duration::minutes(30);
        store.update("stale", 1.0, 2.0, t0());
        store.update("refreshed", 1.0, 2.0, t0());
        let mut candidates = store.list_ids();
        candidates.push("vanished".to_string());

        let now = t0() + chrono::Duration::hours(1);
        store.update("refreshed", 1.5, 2.5, now);

        let removed = store.remove_expired(&candidates, now, timeout);

        assert_eq!(removed, vec!["stale".to_string()]);
        assert!(store.get("refreshed").is_some());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_list_with_last_seen_skips_ill_formed() {
        let store = SessionStore::new();
        store.update("good", 1.0, 2.0, t0());
        store.update("bad", f64::NAN, 2.0, t0());

        let listed = store.list_with_last_seen();

        assert_eq!(listed.len(), 1);
        assert_eq!(listed.get("good"), Some(&t0()));
    }

    #[test]
    fn test_concurrent_updates_to_distinct_sessions_are_all_kept() {
        let store = Arc::new(SessionStore::new());
        let threads: Vec<_> = (0..8)
            .map(|t| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for i in 0..250 {
                        let id = format!("session-{t}-{i}");
                        let v = f64::from(t * 1000 + i);
                        store.update(&id, v, -v, t0());
                    }
                })
            })
            .collect();
        for handle in threads {
            handle.join().unwrap();
        }

        assert_eq!(store.len(), 8 * 250);
        for t in 0..8 {
            for i in 0..250 {
                let v = f64::from(t * 1000 + i);
                let record = store.get(&format!("session-{t}-{i}")).unwrap();
                assert_eq!((record.latitude, record.longitude), (v, -v));
            }
        }
    }
}
