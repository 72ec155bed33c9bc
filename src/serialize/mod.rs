pub mod sink;
pub mod stream;

pub use sink::{BufferSink, ChunkSink};
pub use stream::write_result_group;
