//! Server-generated correlation id linking a speed test to a location.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Numeric id under which a session's location and speed-test rows are
/// persisted.
///
/// Ids are drawn at random from [`TestId::MIN`]..=[`TestId::MAX`] and are not
/// globally unique: two sessions may be handed the same value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TestId(pub i64);

impl TestId {
    pub const MIN: i64 = 100_000;
    pub const MAX: i64 = 999_999;

    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    pub fn as_i64(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for TestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for TestId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
