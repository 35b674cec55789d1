//! Correlation Id Allocator
//!
//! Maps a client session to the numeric test id its persisted rows are
//! written under. Guarded by its own lock, independent of the session store,
//! so id generation never queues behind location updates.

use std::collections::HashMap;

use parking_lot::Mutex;
use rand::Rng;

use crate::domain::TestId;

#[derive(Debug, Default)]
pub struct IdAllocator {
    ids: Mutex<HashMap<String, TestId>>,
}

impl IdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Draw a fresh id for `session_id`, replacing any previous one.
    ///
    /// Ids are random within [`TestId::MIN`]..=[`TestId::MAX`]; collisions
    /// across sessions are possible and accepted.
    pub fn generate(&self, session_id: &str) -> TestId {
        let id = TestId(rand::rng().random_range(TestId::MIN..=TestId::MAX));
        self.ids.lock().insert(session_id.to_owned(), id);
        id
    }

    /// The most recently generated id for `session_id`.
    pub fn resolve(&self, session_id: &str) -> Option<TestId> {
        self.ids.lock().get(session_id).copied()
    }

    pub fn remove(&self, session_id: &str) {
        self.ids.lock().remove(session_id);
    }

    pub fn remove_many<'a, I>(&self, session_ids: I)
    where
        I: IntoIterator<Item = &'a String>,
    {
        let mut ids = self.ids.lock();
        for id in session_ids {
            ids.remove(id);
        }
    }

    pub fn len(&self) -> usize {
        self.ids.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
