use thiserror::Error;

/// Error surfaced by a series point stream while it is being drained.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("point stream errored: {0}")]
pub struct PointStreamError(pub String);

/// A point value, tagged as integer or floating-point. The tag decides how
/// the value renders in output: integers carry no fractional separator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointValue {
    Integer(i64),
    Float(f64),
}

impl PointValue {
    pub fn is_integer(&self) -> bool {
        matches!(self, PointValue::Integer(_))
    }
}

/// One (timestamp, value) pair. Timestamps are epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DataPoint {
    pub timestamp_ms: i64,
    pub value: PointValue,
}

impl DataPoint {
    pub fn integer(timestamp_ms: i64, value: i64) -> Self {
        Self {
            timestamp_ms,
            value: PointValue::Integer(value),
        }
    }

    pub fn float(timestamp_ms: i64, value: f64) -> Self {
        Self {
            timestamp_ms,
            value: PointValue::Float(value),
        }
    }
}
