//! engine/compressor.rs
//! Pull-based compressor engine backed by a blocking write pipeline.
//!
//! The engine is synchronous and single-threaded: the pipeline's writes run
//! inside the caller's `compress()` stack and land back in this engine
//! through [`EngineSink`]. Bytes that fit the caller's current output window
//! take the bounded direct lane; overflow spills into a growable FIFO buffer
//! and is drained by later `compress()` calls. The spill buffer is hopefully
//! bounded by the finite windows given to `set_input()`; if we let the sink
//! block instead, we would need a thread to drive it, which is exactly what
//! the decompressor does.

use std::io::{self, Write};
use std::mem;
use std::sync::{Arc, Mutex};

use bytes::Bytes;
use log::debug;

use crate::config::CodecConfig;
use crate::engine::buffer::GrowableBuffer;
use crate::engine::pipeline::{SinkFactory, SinkPipeline};
use crate::types::EngineError;

/// Two-target routing state shared between the engine and its pipeline.
#[derive(Debug)]
struct SinkState {
    /// Bytes destined for the caller's output window of the current
    /// `compress()` call, capped by `direct_room`.
    direct: Vec<u8>,
    /// Remaining capacity of the direct lane; 0 outside a `compress()` call.
    direct_room: usize,
    /// Overflow bytes the caller has not pulled yet.
    buffer: GrowableBuffer,
}

/// Raw byte sink handed to the pipeline factory; the write end of the
/// engine's two-target router. Writing never blocks and never fails.
pub struct EngineSink {
    state: Arc<Mutex<SinkState>>,
}

impl Write for EngineSink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut st = self.state.lock().unwrap();
        let mut rest = buf;

        // The direct lane keeps FIFO order only while the spill buffer is
        // empty; otherwise everything goes behind the buffered bytes.
        if st.buffer.is_empty() && st.direct_room > 0 {
            let n = rest.len().min(st.direct_room);
            st.direct.extend_from_slice(&rest[..n]);
            st.direct_room -= n;
            rest = &rest[n..];
        }

        st.buffer.append(rest);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        // Pull API: nothing to push further down.
        Ok(())
    }
}

/// Pull-based compressor ("transformer" would be the honest word) mirroring
/// the host framework contract: `set_input` / `needs_input` / `finish` /
/// `compress` / `finished`, with byte counters and reinit support.
pub struct StreamCompressor {
    config: CodecConfig,
    factory: Box<dyn SinkFactory>,
    state: Arc<Mutex<SinkState>>,
    /// Chain head built by the factory; `None` after `end()` or when a
    /// `reinit` failed to build a replacement.
    stream: Option<Box<dyn SinkPipeline>>,
    /// Pending input window, fully consumed by the next `compress()` call.
    input: Bytes,
    has_finished: bool,
    stream_closed: bool,
    bytes_read: u64,
    bytes_written: u64,
}

impl StreamCompressor {
    /// Build an engine and its pipeline. Factory failures surface here as
    /// [`EngineError::Config`].
    pub fn new(
        config: CodecConfig,
        factory: impl SinkFactory + 'static,
    ) -> Result<Self, EngineError> {
        let state = Arc::new(Mutex::new(SinkState {
            direct: Vec::new(),
            direct_room: 0,
            buffer: GrowableBuffer::with_capacity(config.initial_buffer_size),
        }));

        let factory: Box<dyn SinkFactory> = Box::new(factory);
        let stream = factory.create(&config, EngineSink { state: state.clone() })?;

        Ok(Self {
            config,
            factory,
            state,
            stream: Some(stream),
            input: Bytes::new(),
            has_finished: false,
            stream_closed: false,
            bytes_read: 0,
            bytes_written: 0,
        })
    }

    /// Record the next input window. Must only be called when
    /// `needs_input()` is true; a premature call silently overwrites the
    /// pending window. The bytes are copied: the engine may outlive the
    /// caller's buffer.
    pub fn set_input(&mut self, input: &[u8]) {
        self.input = Bytes::copy_from_slice(input);
    }

    pub fn needs_input(&self) -> bool {
        self.input.is_empty() && !self.has_finished
    }

    /// Declare that no further input will arrive. Does not flush by itself;
    /// the next `compress()` call closes the pipeline and routes its trailer.
    pub fn finish(&mut self) {
        self.has_finished = true;
    }

    pub fn finished(&self) -> bool {
        self.has_finished
            && self.input.is_empty()
            && self.stream_closed
            && self.state.lock().unwrap().buffer.is_empty()
    }

    /// Pull transformed bytes into `out`. Drains buffered output first, then
    /// feeds the whole pending input window through the pipeline, routing
    /// its live output into the remaining room of `out` and spilling the
    /// rest. Returns the number of bytes written into `out`; 0 is legal
    /// while not `finished()` and means "feed more input".
    pub fn compress(&mut self, out: &mut [u8]) -> Result<usize, EngineError> {
        // Draw as much as possible from the spill buffer.
        let mut n = self.state.lock().unwrap().buffer.drain_into(out);
        self.bytes_written += n as u64;

        if n == out.len() || self.stream_closed {
            return Ok(n);
        }

        // Buffer is empty now: open the direct lane for the rest of `out`.
        // The lock is not held across pipeline calls; the pipeline re-enters
        // this engine through EngineSink.
        {
            let mut st = self.state.lock().unwrap();
            debug_assert!(st.direct.is_empty());
            st.direct_room = out.len() - n;
        }

        let result = self.feed_and_maybe_close();

        // Harvest the direct lane even on error so the sink state is clean.
        let direct = {
            let mut st = self.state.lock().unwrap();
            st.direct_room = 0;
            mem::take(&mut st.direct)
        };
        out[n..n + direct.len()].copy_from_slice(&direct);
        n += direct.len();
        self.bytes_written += direct.len() as u64;

        result?;
        Ok(n)
    }

    fn feed_and_maybe_close(&mut self) -> Result<(), EngineError> {
        let stream = self
            .stream
            .as_mut()
            .ok_or(EngineError::IllegalState("compressor pipeline unavailable"))?;

        let input = mem::take(&mut self.input);
        if !input.is_empty() {
            stream.write_all(&input)?;
            self.bytes_read += input.len() as u64;
        }

        // No more data expected: close the pipeline to force the trailer out.
        if self.has_finished {
            stream.finish()?;
            self.stream = None;
            self.stream_closed = true;
        }

        Ok(())
    }

    /// Discard all buffered state and build a fresh pipeline from `config`.
    /// Counters restart at zero. The engine object itself survives.
    pub fn reinit(&mut self, config: CodecConfig) -> Result<(), EngineError> {
        self.config = config;
        self.rebuild()
    }

    /// `reinit` with the current configuration.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.rebuild()
    }

    fn rebuild(&mut self) -> Result<(), EngineError> {
        debug!("compressor reinit: rebuilding pipeline");
        self.stream = None;
        self.input = Bytes::new();
        self.has_finished = false;
        self.stream_closed = false;
        self.bytes_read = 0;
        self.bytes_written = 0;
        {
            let mut st = self.state.lock().unwrap();
            st.direct.clear();
            st.direct_room = 0;
            st.buffer.clear();
        }

        let sink = EngineSink { state: self.state.clone() };
        self.stream = Some(self.factory.create(&self.config, sink)?);
        Ok(())
    }

    /// Close the pipeline if still open, releasing its resources. Idempotent.
    /// Trailer bytes land in the spill buffer and stay drainable.
    pub fn end(&mut self) -> Result<(), EngineError> {
        if let Some(mut stream) = self.stream.take() {
            if !self.stream_closed {
                self.stream_closed = true;
                stream.finish()?;
            }
        }
        Ok(())
    }

    pub fn get_bytes_read(&self) -> u64 {
        self.bytes_read
    }

    pub fn get_bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Preset dictionaries are unsupported.
    pub fn needs_dictionary(&self) -> bool {
        false
    }

    pub fn set_dictionary(&mut self, _dict: &[u8]) -> Result<(), EngineError> {
        Err(EngineError::Unsupported("preset dictionaries"))
    }
}
