//! engine/mod.rs
//! Pull engines bridging the host framework's chunked contract onto
//! blocking stream pipelines.
//!
//! - `buffer`: growable FIFO spill store.
//! - `pipeline`: the factory seam and pipeline traits.
//! - `compressor`: synchronous push-to-pull output engine.
//! - `decompressor`: pump-thread-backed pull-to-push input engine.

pub mod buffer;
pub mod compressor;
pub mod decompressor;
pub mod pipeline;

pub use buffer::GrowableBuffer;
pub use compressor::{EngineSink, StreamCompressor};
pub use decompressor::{EngineSource, StreamDecompressor};
pub use pipeline::{SinkFactory, SinkPipeline, SourceFactory};
