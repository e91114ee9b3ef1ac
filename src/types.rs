//! types.rs
//! Unified engine error covering configuration, transformation, worker and
//! misuse failures.
//! - Ergonomic `From<io::Error>` enables `?` across pipeline calls.
//! - Messages aim to be stable and contextual for logs.

use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EngineError {
    /// Pipeline factory failed at construction or reinit.
    #[error("pipeline configuration error: {0}")]
    Config(String),

    /// Pipeline failed mid-stream. The owning engine is no longer usable.
    #[error("stream transformation error: {0}")]
    Transform(#[from] io::Error),

    /// Decompressor worker failed or is gone; delivered to the pending call
    /// and to every later call instead of blocking forever.
    #[error("decompressor worker error: {0}")]
    Worker(String),

    /// Operation not supported by these engines (preset dictionaries).
    #[error("unsupported operation: {0}")]
    Unsupported(&'static str),

    /// Engine misuse, such as compressing after end().
    #[error("illegal engine state: {0}")]
    IllegalState(&'static str),
}
