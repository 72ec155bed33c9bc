use chrono::Utc;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;

/// Handle to one recorded span.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpanId(usize);

#[derive(Debug, Clone)]
struct SpanRecord {
    name: String,
    parent: Option<usize>,
    start_ms: i64,
    end_ms: Option<i64>,
}

/// Per-request span recorder. The span opened at construction is the
/// request's first span; everything else parents off it.
pub struct RequestTrace {
    trace_id: u64,
    spans: Mutex<Vec<SpanRecord>>,
}

impl RequestTrace {
    /// Opens a trace whose root span is already started.
    pub fn root(name: &str) -> Arc<Self> {
        Arc::new(Self {
            trace_id: rand::random(),
            spans: Mutex::new(vec![SpanRecord {
                name: name.to_string(),
                parent: None,
                start_ms: Utc::now().timestamp_millis(),
                end_ms: None,
            }]),
        })
    }

    pub fn first_span(&self) -> SpanId {
        SpanId(0)
    }

    pub fn start_span(&self, name: &str, parent: Option<SpanId>) -> SpanId {
        let mut spans = self.spans.lock();
        spans.push(SpanRecord {
            name: name.to_string(),
            parent: parent.map(|p| p.0),
            start_ms: Utc::now().timestamp_millis(),
            end_ms: None,
        });
        SpanId(spans.len() - 1)
    }

    /// Finishes a span. A span finishes at most once; later calls are
    /// ignored.
    pub fn finish_span(&self, id: SpanId) {
        let mut spans = self.spans.lock();
        if let Some(span) = spans.get_mut(id.0) {
            if span.end_ms.is_none() {
                span.end_ms = Some(Utc::now().timestamp_millis());
            }
        }
    }

    pub fn finish_first(&self) {
        self.finish_span(self.first_span());
    }

    pub fn is_finished(&self, id: SpanId) -> bool {
        self.spans
            .lock()
            .get(id.0)
            .is_some_and(|span| span.end_ms.is_some())
    }

    pub fn span_count(&self) -> usize {
        self.spans.lock().len()
    }

    /// Serializable form of the trace, appended to the response stream.
    pub fn to_json(&self) -> Value {
        let spans: Vec<Value> = self
            .spans
            .lock()
            .iter()
            .map(|span| {
                json!({
                    "name": span.name,
                    "parent": span.parent,
                    "startMs": span.start_ms,
                    "endMs": span.end_ms,
                })
            })
            .collect();
        json!({ "traceId": self.trace_id, "spans": spans })
    }
}
