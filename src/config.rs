//! config.rs
//! Typed codec configuration.
//!
//! Replaces stringly host-framework configuration keys with a serde struct;
//! `from_json` is provided for hosts that carry config as JSON.

use serde::{Deserialize, Serialize};

use crate::constants::{DEFAULT_COMPRESSION_LEVEL, DEFAULT_INITIAL_BUFFER_SIZE};
use crate::types::EngineError;

/// Compression layer selected for the pipeline chain.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionKind {
    /// Pass bytes through unchanged.
    #[default]
    None,
    Gzip,
    Zstd,
}

impl CompressionKind {
    pub fn default_extension(self) -> &'static str {
        match self {
            CompressionKind::None => "",
            CompressionKind::Gzip => ".gz",
            CompressionKind::Zstd => ".zst",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Initial size of the compressor's spill buffer, enlarged as needed.
    pub initial_buffer_size: usize,

    /// Compression layer of the built-in chain.
    pub compression: CompressionKind,

    /// Compression level; `None` picks the codec default.
    pub level: Option<i32>,

    /// Layer a CRC32 accounting wrapper under the compression stage.
    pub checksum: bool,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            initial_buffer_size: DEFAULT_INITIAL_BUFFER_SIZE,
            compression: CompressionKind::None,
            level: None,
            checksum: false,
        }
    }
}

impl CodecConfig {
    pub fn from_json(json: &str) -> Result<Self, EngineError> {
        serde_json::from_str(json).map_err(|e| EngineError::Config(e.to_string()))
    }

    pub fn level_or_default(&self) -> i32 {
        self.level.unwrap_or(DEFAULT_COMPRESSION_LEVEL)
    }
}
