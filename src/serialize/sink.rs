use async_trait::async_trait;
use bytes::Bytes;

/// Incremental output sink for the result stream serializer. Chunks arrive
/// in order; a failed write aborts the stream.
#[async_trait]
pub trait ChunkSink: Send {
    async fn write_chunk(&mut self, chunk: Bytes) -> std::io::Result<()>;
}

/// Collects chunks in memory. Used by tests to capture serializer output.
#[derive(Default)]
pub struct BufferSink {
    pub chunks: Vec<Bytes>,
}

impl BufferSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn concat(&self) -> Vec<u8> {
        self.chunks.iter().flat_map(|c| c.iter().copied()).collect()
    }

    pub fn as_string(&self) -> String {
        String::from_utf8_lossy(&self.concat()).into_owned()
    }
}

#[async_trait]
impl ChunkSink for BufferSink {
    async fn write_chunk(&mut self, chunk: Bytes) -> std::io::Result<()> {
        self.chunks.push(chunk);
        Ok(())
    }
}
