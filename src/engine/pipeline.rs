//! engine/pipeline.rs
//! The factory seam between the pull engines and the blocking stream
//! pipelines they drive.
//!
//! A factory receives a raw handle belonging to the engine (`EngineSink` for
//! the compressor, `EngineSource` for the decompressor) and returns the head
//! of the transformation chain: the engine writes plaintext into the chain
//! head, or reads plaintext out of it, while the chain bottoms out in the
//! engine's handle. Factories are invoked once per engine construction and
//! once more per `reinit`/recreate cycle, with the engine's configuration of
//! that moment.

use std::io::{self, Read, Write};

use crate::config::CodecConfig;
use crate::types::EngineError;

pub use crate::engine::compressor::EngineSink;
pub use crate::engine::decompressor::EngineSource;

/// A blocking write-many chain head. `finish` writes any trailer or footer
/// and flushes; the pipeline must not be written after it.
pub trait SinkPipeline: Write + Send {
    fn finish(&mut self) -> io::Result<()>;
}

/// The raw sink is itself a valid (identity) pipeline.
impl SinkPipeline for EngineSink {
    fn finish(&mut self) -> io::Result<()> {
        self.flush()
    }
}

impl<S: SinkPipeline + ?Sized> SinkPipeline for Box<S> {
    fn finish(&mut self) -> io::Result<()> {
        (**self).finish()
    }
}

/// Builds the write pipeline for a [`StreamCompressor`].
///
/// [`StreamCompressor`]: crate::engine::compressor::StreamCompressor
pub trait SinkFactory: Send {
    fn create(
        &self,
        config: &CodecConfig,
        sink: EngineSink,
    ) -> Result<Box<dyn SinkPipeline>, EngineError>;
}

/// Builds the read pipeline for a [`StreamDecompressor`]. Runs on the
/// engine's pump thread, so it may block reading stream headers from the
/// source during construction.
///
/// Contract for implementers: when the source has no pending input and the
/// caller has not called `finish()`, `EngineSource::read` returns `Ok(0)`
/// without blocking. The returned pipeline must surface that zero-progress
/// read to its own caller rather than spin-looping on it. Pipelines that
/// treat a premature `Ok(0)` as a hard end-of-stream (most decoder adapters
/// do) require the caller to supply the full stream before pulling.
///
/// [`StreamDecompressor`]: crate::engine::decompressor::StreamDecompressor
pub trait SourceFactory: Send {
    fn create(
        &self,
        config: &CodecConfig,
        source: EngineSource,
    ) -> Result<Box<dyn Read + Send>, EngineError>;
}
