use chrono::Utc;
use thiserror::Error;
use tracing::debug;

use super::types::{MetricQuery, RawQuery, TimeRange, ValidatedQuery};

#[derive(Debug, Error)]
pub enum QueryParseError {
    /// The payload violated the wire schema.
    #[error("malformed query: {0}")]
    Malformed(String),

    /// The payload was well-formed but semantically unusable.
    #[error("invalid query: {0}")]
    Invalid(String),
}

/// Deserializes and validates a raw query payload. The format pass rejects
/// structurally broken payloads as `Malformed`; the semantic pass rejects
/// unusable ones as `Invalid`. A missing group identifier defaults to the
/// empty identifier.
pub fn parse_query(body: &[u8]) -> Result<ValidatedQuery, QueryParseError> {
    let raw: RawQuery =
        serde_json::from_slice(body).map_err(|e| QueryParseError::Malformed(e.to_string()))?;

    let Some(start_ms) = raw.start else {
        return Err(QueryParseError::Malformed(
            "missing required field: start".to_string(),
        ));
    };
    let subs = match raw.queries {
        Some(subs) if !subs.is_empty() => subs,
        _ => {
            return Err(QueryParseError::Malformed(
                "at least one sub-query is required".to_string(),
            ));
        }
    };

    let end_ms = raw.end.unwrap_or_else(|| Utc::now().timestamp_millis());
    let metrics = subs
        .into_iter()
        .map(|sub| MetricQuery {
            metric: sub.metric.unwrap_or_default(),
            aggregator: sub.aggregator.unwrap_or_default(),
            tags: sub.tags,
            downsample: sub.downsample,
            rate: sub.rate,
        })
        .collect();

    let query = ValidatedQuery {
        group_id: raw.group_id.unwrap_or_default(),
        range: TimeRange { start_ms, end_ms },
        metrics,
    };
    validate(&query)?;

    debug!(
        target: "tsgate::query",
        group_id = %query.group_id,
        metrics = query.metrics.len(),
        "validated query"
    );
    Ok(query)
}

/// Semantic pass over the converted query.
fn validate(query: &ValidatedQuery) -> Result<(), QueryParseError> {
    if query.range.is_empty() {
        return Err(QueryParseError::Invalid("empty time range".to_string()));
    }
    for metric in &query.metrics {
        if metric.metric.is_empty() {
            return Err(QueryParseError::Invalid(
                "sub-query is missing a metric".to_string(),
            ));
        }
        if metric.aggregator.is_empty() {
            return Err(QueryParseError::Invalid(
                "sub-query is missing an aggregator".to_string(),
            ));
        }
    }
    Ok(())
}
