use crate::trace::{NoopTracer, QueryTracer, RecordingTracer, RequestTrace};

#[test]
fn root_opens_the_first_span() {
    let trace = RequestTrace::root("query/v2");
    assert_eq!(trace.span_count(), 1);
    assert!(!trace.is_finished(trace.first_span()));
}

#[test]
fn child_span_parents_off_the_first_span() {
    let trace = RequestTrace::root("query/v2");
    let child = trace.start_span("serialization", Some(trace.first_span()));
    assert_eq!(trace.span_count(), 2);

    let json = trace.to_json();
    let spans = json["spans"].as_array().unwrap();
    assert_eq!(spans[1]["name"], "serialization");
    assert_eq!(spans[1]["parent"], 0);

    trace.finish_span(child);
    assert!(trace.is_finished(child));
}

#[test]
fn spans_finish_at_most_once() {
    let trace = RequestTrace::root("query/v2");
    trace.finish_first();
    let first_end = trace.to_json()["spans"][0]["endMs"].clone();
    assert!(first_end.is_i64());

    std::thread::sleep(std::time::Duration::from_millis(5));
    trace.finish_first();
    assert_eq!(trace.to_json()["spans"][0]["endMs"], first_end);
}

#[test]
fn noop_tracer_creates_no_spans() {
    assert!(NoopTracer.trace_query().is_none());
}

#[test]
fn recording_tracer_opens_a_trace() {
    let trace = RecordingTracer.trace_query().unwrap();
    assert_eq!(trace.span_count(), 1);
}
