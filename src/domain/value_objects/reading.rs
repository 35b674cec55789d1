//! Loosely-typed throughput and latency values.

use serde::{Deserialize, Serialize};

/// Marker the browser test client reports when a phase did not complete.
pub const FAILURE_MARKER: &str = "Fail";

/// A measurement as it arrives from clients or storage: either a number or
/// free text such as `"12.7"` or `"Fail"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Reading {
    Number(f64),
    Text(String),
}

impl Reading {
    /// Numeric value of the reading, if it has one.
    ///
    /// The failure marker, unparseable text and non-finite numbers all yield
    /// `None`.
    pub fn value(&self) -> Option<f64> {
        let value = match self {
            Reading::Number(n) => *n,
            Reading::Text(s) => {
                let s = s.trim();
                if s.eq_ignore_ascii_case(FAILURE_MARKER) {
                    return None;
                }
                s.parse::<f64>().ok()?
            }
        };
        value.is_finite().then_some(value)
    }

    /// Value with every unusable reading collapsed to zero.
    pub fn value_or_zero(&self) -> f64 {
        self.value().unwrap_or(0.0)
    }
}

impl From<f64> for Reading {
    fn from(value: f64) -> Self {
        Reading::Number(value)
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Reading::Text(value.to_string())
    }
}

/// Collapse an optional reading to a number, treating absence as zero.
pub fn reading_or_zero(reading: Option<&Reading>) -> f64 {
    reading.map(Reading::value_or_zero).unwrap_or(0.0)
}
