use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Raw wire shape of a query request, before either validation pass.
#[derive(Debug, Deserialize)]
pub struct RawQuery {
    pub start: Option<i64>,
    pub end: Option<i64>,
    #[serde(default, rename = "groupId")]
    pub group_id: Option<String>,
    pub queries: Option<Vec<RawSubQuery>>,
}

#[derive(Debug, Deserialize)]
pub struct RawSubQuery {
    pub metric: Option<String>,
    pub aggregator: Option<String>,
    #[serde(default)]
    pub tags: IndexMap<String, String>,
    pub downsample: Option<String>,
    #[serde(default)]
    pub rate: bool,
}

/// Half-open time range in epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TimeRange {
    pub start_ms: i64,
    pub end_ms: i64,
}

impl TimeRange {
    pub fn is_empty(&self) -> bool {
        self.end_ms <= self.start_ms
    }
}

/// One metric sub-query of a validated request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MetricQuery {
    pub metric: String,
    pub aggregator: String,
    pub tags: IndexMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub downsample: Option<String>,
    pub rate: bool,
}

/// Query after both validation passes. Immutable once built; the group
/// identifier correlates the eventual result with this request.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedQuery {
    pub group_id: String,
    pub range: TimeRange,
    pub metrics: Vec<MetricQuery>,
}
