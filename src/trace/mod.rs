pub mod recorder;

pub use recorder::{RequestTrace, SpanId};

use std::sync::Arc;

/// Capability seam for per-query tracing. The controller never null-checks a
/// tracer; it asks this trait and gets either a live recorder or nothing.
pub trait QueryTracer: Send + Sync {
    /// Returns a recorder with the first span already open, or `None` when
    /// tracing is disabled.
    fn trace_query(&self) -> Option<Arc<RequestTrace>>;
}

/// Tracing disabled: no span objects are ever created.
pub struct NoopTracer;

impl QueryTracer for NoopTracer {
    fn trace_query(&self) -> Option<Arc<RequestTrace>> {
        None
    }
}

/// Tracing enabled: records spans in memory for the trailing trace element.
pub struct RecordingTracer;

impl QueryTracer for RecordingTracer {
    fn trace_query(&self) -> Option<Arc<RequestTrace>> {
        Some(RequestTrace::root("query/v2"))
    }
}

pub fn tracer_from_config(enabled: bool) -> Arc<dyn QueryTracer> {
    if enabled {
        Arc::new(RecordingTracer)
    } else {
        Arc::new(NoopTracer)
    }
}

#[cfg(test)]
mod recorder_test;
