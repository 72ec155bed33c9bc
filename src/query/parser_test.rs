use indoc::indoc;

use crate::query::parser::{QueryParseError, parse_query};

#[test]
fn structurally_broken_payload_is_malformed() {
    let err = parse_query(b"{not json").unwrap_err();
    assert!(matches!(err, QueryParseError::Malformed(_)));
}

#[test]
fn missing_start_is_malformed() {
    let body = indoc! {r#"
        {"queries": [{"metric": "sys.cpu", "aggregator": "sum"}]}
    "#};
    let err = parse_query(body.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryParseError::Malformed(_)));
}

#[test]
fn empty_query_list_is_malformed() {
    let body = r#"{"start": 1000, "queries": []}"#;
    let err = parse_query(body.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryParseError::Malformed(_)));
}

#[test]
fn missing_metric_is_invalid() {
    let body = r#"{"start": 1000, "end": 2000, "queries": [{"aggregator": "sum"}]}"#;
    let err = parse_query(body.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryParseError::Invalid(_)));
}

#[test]
fn missing_aggregator_is_invalid() {
    let body = r#"{"start": 1000, "end": 2000, "queries": [{"metric": "sys.cpu"}]}"#;
    let err = parse_query(body.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryParseError::Invalid(_)));
}

#[test]
fn empty_time_range_is_invalid() {
    let body =
        r#"{"start": 2000, "end": 2000, "queries": [{"metric": "sys.cpu", "aggregator": "sum"}]}"#;
    let err = parse_query(body.as_bytes()).unwrap_err();
    assert!(matches!(err, QueryParseError::Invalid(_)));
}

#[test]
fn valid_payload_round_trips() {
    let body = indoc! {r#"
        {
            "start": 1000,
            "end": 2000,
            "queries": [
                {
                    "metric": "sys.cpu",
                    "aggregator": "sum",
                    "tags": {"host": "a", "dc": "east"},
                    "downsample": "1m-avg",
                    "rate": true
                }
            ]
        }
    "#};
    let query = parse_query(body.as_bytes()).unwrap();
    assert_eq!(query.group_id, "");
    assert_eq!(query.range.start_ms, 1000);
    assert_eq!(query.range.end_ms, 2000);
    assert_eq!(query.metrics.len(), 1);

    let metric = &query.metrics[0];
    assert_eq!(metric.metric, "sys.cpu");
    assert_eq!(metric.aggregator, "sum");
    assert_eq!(metric.tags.get("host").map(String::as_str), Some("a"));
    assert_eq!(metric.tags.get("dc").map(String::as_str), Some("east"));
    assert_eq!(metric.downsample.as_deref(), Some("1m-avg"));
    assert!(metric.rate);
}

#[test]
fn group_id_is_preserved_when_supplied() {
    let body = r#"{"start": 1000, "end": 2000, "groupId": "g1", "queries": [{"metric": "sys.cpu", "aggregator": "sum"}]}"#;
    let query = parse_query(body.as_bytes()).unwrap();
    assert_eq!(query.group_id, "g1");
}

#[test]
fn missing_end_defaults_to_now() {
    let body = r#"{"start": 1000, "queries": [{"metric": "sys.cpu", "aggregator": "sum"}]}"#;
    let query = parse_query(body.as_bytes()).unwrap();
    assert!(query.range.end_ms > 1000);
}
