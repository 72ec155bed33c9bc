use indexmap::IndexMap;

use super::point::{DataPoint, PointStreamError};

/// Identity of one time series: metric name candidates, tag pairs in
/// insertion order, and the tag keys that were folded into rollups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesId {
    pub metrics: Vec<String>,
    pub tags: IndexMap<String, String>,
    pub aggregated_tags: Vec<String>,
}

impl SeriesId {
    pub fn new(metric: impl Into<String>) -> Self {
        Self {
            metrics: vec![metric.into()],
            tags: IndexMap::new(),
            aggregated_tags: Vec::new(),
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_aggregated_tag(mut self, key: impl Into<String>) -> Self {
        self.aggregated_tags.push(key.into());
        self
    }

    /// The primary metric name. Only this one is emitted when a series
    /// exposes more than one candidate.
    pub fn primary_metric(&self) -> Option<&str> {
        self.metrics.first().map(String::as_str)
    }
}

/// Lazily produced point sequence. Consuming it is destructive and
/// single-pass; an `Err` item means the stream errored mid-drain.
pub type DataPoints = Box<dyn Iterator<Item = Result<DataPoint, PointStreamError>> + Send>;

/// One identified time series with its point stream.
pub struct Series {
    pub id: SeriesId,
    pub points: DataPoints,
}

impl Series {
    pub fn new(id: SeriesId, points: DataPoints) -> Self {
        Self { id, points }
    }

    /// Series over an already materialized point list.
    pub fn from_points(id: SeriesId, points: Vec<DataPoint>) -> Self {
        Self {
            id,
            points: Box::new(points.into_iter().map(Ok)),
        }
    }
}

/// Backend-defined grouping of series. Group boundaries are not reflected
/// in serialized output.
pub struct SeriesGroup {
    pub group_id: String,
    pub series: Vec<Series>,
}

/// The backend's full output for one query, ordered as produced.
pub struct ResultGroup {
    pub group_id: String,
    pub groups: Vec<SeriesGroup>,
}

impl ResultGroup {
    pub fn empty(group_id: impl Into<String>) -> Self {
        Self {
            group_id: group_id.into(),
            groups: Vec::new(),
        }
    }

    pub fn series_count(&self) -> usize {
        self.groups.iter().map(|g| g.series.len()).sum()
    }
}
