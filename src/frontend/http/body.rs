use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Full};
use hyper::body::{Body, Frame};
use tokio::sync::mpsc;

use crate::serialize::ChunkSink;

pub type ResponseBody = BoxBody<Bytes, std::io::Error>;

/// Fixed response body from an in-memory buffer.
pub fn full(bytes: impl Into<Bytes>) -> ResponseBody {
    Full::new(bytes.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Streaming body fed by the serializer task through a bounded channel.
/// The body ends when the sending side is dropped.
struct ChannelBody {
    rx: mpsc::Receiver<Result<Frame<Bytes>, std::io::Error>>,
}

impl Body for ChannelBody {
    type Data = Bytes;
    type Error = std::io::Error;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<Frame<Self::Data>, Self::Error>>> {
        self.get_mut().rx.poll_recv(cx)
    }
}

/// Sending side of a streaming response body.
pub struct HttpChunkSink {
    tx: mpsc::Sender<Result<Frame<Bytes>, std::io::Error>>,
}

impl HttpChunkSink {
    /// Terminates the stream with an error frame. The connection is torn
    /// down mid-body, so the client sees a truncated response rather than a
    /// well-formed one that is silently incomplete.
    pub async fn abort(self, error: std::io::Error) {
        let _ = self.tx.send(Err(error)).await;
    }
}

#[async_trait]
impl ChunkSink for HttpChunkSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> std::io::Result<()> {
        self.tx
            .send(Ok(Frame::data(chunk)))
            .await
            .map_err(|_| std::io::Error::new(std::io::ErrorKind::BrokenPipe, "client went away"))
    }
}

/// Paired sink and response body for one streamed response.
pub fn streaming_channel(capacity: usize) -> (HttpChunkSink, ResponseBody) {
    let (tx, rx) = mpsc::channel(capacity);
    (HttpChunkSink { tx }, ChannelBody { rx }.boxed())
}
