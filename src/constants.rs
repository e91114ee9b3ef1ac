//! constants.rs
//! Crate-wide defaults and sanity bounds.

/// Initial capacity of the compressor's spill buffer, enlarged as needed.
pub const DEFAULT_INITIAL_BUFFER_SIZE: usize = 1024;

/// Default compression level (gzip and zstd).
pub const DEFAULT_COMPRESSION_LEVEL: i32 = 6;

/// Depth of the decompressor's request queue. Exactly one action is ever in
/// flight: the caller blocks on its reply before issuing the next one.
pub const ACTION_QUEUE_DEPTH: usize = 1;

/// Name of the decompressor's pump thread.
pub const PUMP_THREAD_NAME: &str = "pullcodec-pump";
