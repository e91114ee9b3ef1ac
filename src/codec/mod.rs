//! codec/mod.rs
//! Config-driven codec front door: builds matched compressor/decompressor
//! engine pairs whose pipeline chains are assembled from [`CodecConfig`].
//!
//! Chain layout (sink side, mirrored for sources):
//!
//! ```text
//! engine plaintext -> [compression encoder] -> [crc32 accounting] -> raw sink
//! ```

pub mod checksum;

use std::io::Read;

use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use zstd::stream::read::Decoder as ZstdDecoder;
use zstd::stream::write::Encoder as ZstdEncoder;

use crate::codec::checksum::{Crc32Reader, Crc32Writer};
use crate::config::{CodecConfig, CompressionKind};
use crate::engine::compressor::{EngineSink, StreamCompressor};
use crate::engine::decompressor::{EngineSource, StreamDecompressor};
use crate::engine::pipeline::{SinkFactory, SinkPipeline, SourceFactory};
use crate::types::EngineError;

impl<W: std::io::Write + Send> SinkPipeline for GzEncoder<W> {
    fn finish(&mut self) -> std::io::Result<()> {
        self.try_finish()
    }
}

impl<W: std::io::Write + Send> SinkPipeline for ZstdEncoder<'static, W> {
    fn finish(&mut self) -> std::io::Result<()> {
        self.do_finish()
    }
}

/// Factory assembling the built-in chain from the engine configuration.
/// Stateless: everything comes from the config passed per create call, so a
/// `reinit` with fresh configuration rebuilds a matching pipeline.
pub struct ChainFactory;

impl SinkFactory for ChainFactory {
    fn create(
        &self,
        config: &CodecConfig,
        sink: EngineSink,
    ) -> Result<Box<dyn SinkPipeline>, EngineError> {
        let mut chain: Box<dyn SinkPipeline> = Box::new(sink);

        if config.checksum {
            chain = Box::new(Crc32Writer::new(chain));
        }

        chain = match config.compression {
            CompressionKind::None => chain,
            CompressionKind::Gzip => {
                let level = config.level_or_default().clamp(0, 9) as u32;
                Box::new(GzEncoder::new(chain, Compression::new(level)))
            }
            CompressionKind::Zstd => Box::new(
                ZstdEncoder::new(chain, config.level_or_default())
                    .map_err(|e| EngineError::Config(e.to_string()))?,
            ),
        };

        Ok(chain)
    }
}

impl SourceFactory for ChainFactory {
    fn create(
        &self,
        config: &CodecConfig,
        source: EngineSource,
    ) -> Result<Box<dyn Read + Send>, EngineError> {
        let mut chain: Box<dyn Read + Send> = Box::new(source);

        if config.checksum {
            chain = Box::new(Crc32Reader::new(chain));
        }

        chain = match config.compression {
            CompressionKind::None => chain,
            CompressionKind::Gzip => Box::new(GzDecoder::new(chain)),
            CompressionKind::Zstd => Box::new(
                ZstdDecoder::new(chain).map_err(|e| EngineError::Config(e.to_string()))?,
            ),
        };

        Ok(chain)
    }
}

/// Codec front door mirroring the host framework's codec interface: one
/// configuration, matched engine pairs, a default file extension.
pub struct TransformCodec {
    config: CodecConfig,
}

impl TransformCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    pub fn create_compressor(&self) -> Result<StreamCompressor, EngineError> {
        StreamCompressor::new(self.config.clone(), ChainFactory)
    }

    pub fn create_decompressor(&self) -> Result<StreamDecompressor, EngineError> {
        StreamDecompressor::new(self.config.clone(), ChainFactory)
    }

    /// Conventional extension for files produced by this codec.
    pub fn default_extension(&self) -> &'static str {
        self.config.compression.default_extension()
    }
}
