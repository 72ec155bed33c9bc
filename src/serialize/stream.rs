use bytes::Bytes;
use tracing::{debug, warn};

use crate::model::{PointValue, ResultGroup, Series};
use crate::trace::RequestTrace;

use super::sink::ChunkSink;

/// Flush boundary for the streamed body; keeps memory bounded under large
/// result sets.
const FLUSH_THRESHOLD: usize = 8 * 1024;

/// Streams a `ResultGroup` as one flat JSON array over `sink`. Group
/// boundaries are not reflected in output; series appear in backend order;
/// each series' point stream is drained single-pass. Bytes already flushed
/// stand if draining errors. A trace, when present, is appended as a
/// trailing element on a best-effort basis.
pub async fn write_result_group<S: ChunkSink>(
    sink: &mut S,
    group: ResultGroup,
    trace: Option<&RequestTrace>,
) -> std::io::Result<()> {
    let serdes_span = trace.map(|t| t.start_span("serialization", Some(t.first_span())));

    let mut buf: Vec<u8> = Vec::with_capacity(FLUSH_THRESHOLD);
    buf.push(b'[');
    let mut wrote_series = false;

    for series_group in group.groups {
        for series in series_group.series {
            if wrote_series {
                buf.push(b',');
            }
            write_series(&mut buf, sink, series).await?;
            wrote_series = true;
            flush(sink, &mut buf).await?;
        }
    }

    if let Some(trace) = trace {
        append_trace(&mut buf, trace, wrote_series);
    }
    buf.push(b']');
    flush(sink, &mut buf).await?;

    if let (Some(trace), Some(span)) = (trace, serdes_span) {
        trace.finish_span(span);
    }
    debug!(target: "tsgate::serialize", "result stream flushed");
    Ok(())
}

async fn write_series<S: ChunkSink>(
    buf: &mut Vec<u8>,
    sink: &mut S,
    series: Series,
) -> std::io::Result<()> {
    let Series { id, points } = series;

    buf.extend_from_slice(b"{\"metric\":");
    write_string(buf, id.primary_metric().unwrap_or_default())?;

    buf.extend_from_slice(b",\"tags\":{");
    for (i, (key, value)) in id.tags.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        write_string(buf, key)?;
        buf.push(b':');
        write_string(buf, value)?;
    }

    buf.extend_from_slice(b"},\"aggregateTags\":[");
    for (i, tag) in id.aggregated_tags.iter().enumerate() {
        if i > 0 {
            buf.push(b',');
        }
        write_string(buf, tag)?;
    }

    buf.extend_from_slice(b"],\"dps\":{");
    let mut int_buf = itoa::Buffer::new();
    let mut float_buf = ryu::Buffer::new();
    let mut first = true;
    for point in points {
        let point = point
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))?;
        if !first {
            buf.push(b',');
        }
        first = false;

        buf.push(b'"');
        buf.extend_from_slice(int_buf.format(point.timestamp_ms).as_bytes());
        buf.extend_from_slice(b"\":");
        match point.value {
            PointValue::Integer(v) => buf.extend_from_slice(int_buf.format(v).as_bytes()),
            PointValue::Float(v) if v.is_finite() => {
                buf.extend_from_slice(float_buf.format(v).as_bytes());
            }
            // JSON cannot carry NaN or infinities.
            PointValue::Float(_) => buf.extend_from_slice(b"null"),
        }

        if buf.len() >= FLUSH_THRESHOLD {
            flush(sink, buf).await?;
        }
    }
    buf.extend_from_slice(b"}}");
    Ok(())
}

/// Best effort: a trace that fails to render must not void the series
/// payload already flushed.
fn append_trace(buf: &mut Vec<u8>, trace: &RequestTrace, wrote_series: bool) {
    let mut rendered: Vec<u8> = b"{\"trace\":".to_vec();
    match sonic_rs::to_writer(&mut rendered, &trace.to_json()) {
        Ok(()) => {
            rendered.push(b'}');
            if wrote_series {
                buf.push(b',');
            }
            buf.extend_from_slice(&rendered);
        }
        Err(e) => warn!(target: "tsgate::serialize", "dropping trace element: {}", e),
    }
}

fn write_string(buf: &mut Vec<u8>, s: &str) -> std::io::Result<()> {
    sonic_rs::to_writer(&mut *buf, &s)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string()))
}

async fn flush<S: ChunkSink>(sink: &mut S, buf: &mut Vec<u8>) -> std::io::Result<()> {
    if buf.is_empty() {
        return Ok(());
    }
    sink.write_chunk(Bytes::from(std::mem::take(buf))).await
}
