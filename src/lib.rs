//! pullcodec
//!
//! Pull-based compressor/decompressor engines over blocking stream
//! pipelines: the caller repeatedly supplies input windows and pulls
//! transformed bytes into bounded output windows, while the actual
//! transformation (compression, checksumming, whatever the factory builds)
//! keeps its natural blocking write-many/read-many shape.

#![forbid(unsafe_code)]

// Shared and top level
pub mod constants;
pub mod types;

pub mod config;

// Engines and pipeline chains
pub mod codec;
pub mod engine;

pub use codec::TransformCodec;
pub use config::{CodecConfig, CompressionKind};
pub use engine::{
    EngineSink, EngineSource, GrowableBuffer, SinkFactory, SinkPipeline, SourceFactory,
    StreamCompressor, StreamDecompressor,
};
pub use types::EngineError;
