//! engine/decompressor.rs
//! Pull-based decompressor engine backed by a blocking read pipeline.
//!
//! Unlike the compressor, the pipeline here runs on a dedicated pump thread:
//! source pipelines may block reading stream headers during their own
//! construction, and nothing of that may stall the pulling caller. The
//! caller and the pump exchange single-slot request/response actions; the
//! only state both threads touch is the mutex-guarded input window.

use std::io::Read;
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};

use bytes::{Buf, Bytes};
use crossbeam::channel::{bounded, Receiver, Sender};
use log::{debug, error};

use crate::config::CodecConfig;
use crate::constants::{ACTION_QUEUE_DEPTH, PUMP_THREAD_NAME};
use crate::engine::pipeline::SourceFactory;
use crate::types::EngineError;

/// Input window shared between the caller thread and the pump thread.
/// Critical sections are field copies only.
#[derive(Debug, Default)]
struct InputState {
    window: Bytes,
    finished: bool,
    /// Bytes the pipeline has consumed from the window so far.
    consumed: u64,
}

/// Raw byte source handed to the pipeline factory; reads consume the shared
/// input window. Never blocks: with an empty window it returns `Ok(0)`,
/// which is end-of-data if `finish()` was called and a zero-progress read
/// otherwise (see [`SourceFactory`] for the implementer contract).
pub struct EngineSource {
    state: Arc<Mutex<InputState>>,
}

impl Read for EngineSource {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let mut st = self.state.lock().unwrap();
        let n = buf.len().min(st.window.len());
        buf[..n].copy_from_slice(&st.window[..n]);
        st.window.advance(n);
        st.consumed += n as u64;
        Ok(n)
    }
}

/// Cross-thread request unit; exactly one in flight at a time.
enum Action {
    /// Read up to `len` transformed bytes and reply with them.
    Read {
        len: usize,
        reply: Sender<Result<Vec<u8>, EngineError>>,
    },
    /// Drop the current pipeline; the next `Read` builds a fresh one from
    /// the carried configuration.
    Recreate {
        config: CodecConfig,
        reply: Sender<Result<(), EngineError>>,
    },
    Terminate,
}

/// Pull-based decompressor mirroring the host framework contract, plus
/// `get_remaining()` for the unconsumed window length.
pub struct StreamDecompressor {
    config: CodecConfig,
    state: Arc<Mutex<InputState>>,
    actions: Sender<Action>,
    pump: Option<JoinHandle<()>>,
    bytes_written: u64,
}

impl StreamDecompressor {
    /// Spawn the pump thread. The pipeline itself is built lazily by the
    /// pump on the first `decompress()` call, so factory failures surface
    /// there rather than here.
    pub fn new(
        config: CodecConfig,
        factory: impl SourceFactory + 'static,
    ) -> Result<Self, EngineError> {
        let state = Arc::new(Mutex::new(InputState::default()));
        let (tx, rx) = bounded::<Action>(ACTION_QUEUE_DEPTH);

        let pump_state = state.clone();
        let pump_config = config.clone();
        let factory: Box<dyn SourceFactory> = Box::new(factory);
        let pump = thread::Builder::new()
            .name(PUMP_THREAD_NAME.into())
            .spawn(move || pump(pump_config, factory, rx, pump_state))
            .map_err(|e| EngineError::Worker(format!("failed to spawn pump thread: {e}")))?;

        Ok(Self {
            config,
            state,
            actions: tx,
            pump: Some(pump),
            bytes_written: 0,
        })
    }

    /// Record the next input window. Must only be called when
    /// `needs_input()` is true; a premature call silently overwrites the
    /// pending window. The bytes are copied: the pump consumes them after
    /// this call returns.
    pub fn set_input(&mut self, input: &[u8]) {
        let mut st = self.state.lock().unwrap();
        st.window = Bytes::copy_from_slice(input);
    }

    pub fn needs_input(&self) -> bool {
        let st = self.state.lock().unwrap();
        st.window.is_empty() && !st.finished
    }

    /// Declare that no further input will ever arrive.
    pub fn finish(&mut self) {
        self.state.lock().unwrap().finished = true;
    }

    pub fn finished(&self) -> bool {
        let st = self.state.lock().unwrap();
        st.finished && st.window.is_empty()
    }

    /// Pull up to `out.len()` transformed bytes into `out`, blocking while
    /// the pump drives the pipeline. Returns the number of bytes written;
    /// 0 means end-of-data if `finished()`, otherwise "feed more input".
    pub fn decompress(&mut self, out: &mut [u8]) -> Result<usize, EngineError> {
        let (tx, rx) = bounded(1);
        self.actions
            .send(Action::Read { len: out.len(), reply: tx })
            .map_err(|_| EngineError::Worker("pump thread is gone".into()))?;
        let data = rx
            .recv()
            .map_err(|_| EngineError::Worker("pump thread exited without replying".into()))??;

        out[..data.len()].copy_from_slice(&data);
        self.bytes_written += data.len() as u64;
        Ok(data.len())
    }

    /// Discard all engine state and have the pump build a fresh pipeline
    /// from `config` on the next `decompress()`. Counters restart at zero.
    pub fn reinit(&mut self, config: CodecConfig) -> Result<(), EngineError> {
        self.config = config;
        self.recreate()
    }

    /// `reinit` with the current configuration.
    pub fn reset(&mut self) -> Result<(), EngineError> {
        self.recreate()
    }

    fn recreate(&mut self) -> Result<(), EngineError> {
        {
            let mut st = self.state.lock().unwrap();
            st.window = Bytes::new();
            st.finished = false;
            st.consumed = 0;
        }
        self.bytes_written = 0;

        let (tx, rx) = bounded(1);
        self.actions
            .send(Action::Recreate { config: self.config.clone(), reply: tx })
            .map_err(|_| EngineError::Worker("pump thread is gone".into()))?;
        rx.recv()
            .map_err(|_| EngineError::Worker("pump thread exited without replying".into()))?
    }

    /// Terminate the pump thread and join it. Idempotent; after this the
    /// engine must not be reused (`decompress` fails, it does not hang).
    /// Assumes no `decompress()` call is concurrently pending.
    pub fn end(&mut self) -> Result<(), EngineError> {
        let Some(pump) = self.pump.take() else {
            return Ok(());
        };
        let _ = self.actions.send(Action::Terminate);
        pump.join()
            .map_err(|_| EngineError::Worker("pump thread panicked".into()))
    }

    /// Length of the unconsumed input window.
    pub fn get_remaining(&self) -> usize {
        self.state.lock().unwrap().window.len()
    }

    pub fn get_bytes_read(&self) -> u64 {
        self.state.lock().unwrap().consumed
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

impl Drop for StreamDecompressor {
    fn drop(&mut self) {
        // Best-effort end() so a dropped engine does not leak the pump.
        let _ = self.end();
    }
}

/// Pump loop: owns the pipeline, services one action at a time.
///
/// A pipeline or factory failure is delivered to the pending action, logged,
/// and remembered: every later `Read` is answered with a terminal error
/// instead of leaving the caller blocked on a reply that never comes.
/// `Recreate` clears the failure along with the pipeline.
fn pump(
    mut config: CodecConfig,
    factory: Box<dyn SourceFactory>,
    actions: Receiver<Action>,
    state: Arc<Mutex<InputState>>,
) {
    let mut stream: Option<Box<dyn Read + Send>> = None;
    let mut fatal: Option<String> = None;

    for action in actions.iter() {
        match action {
            Action::Terminate => break,

            Action::Recreate { config: fresh, reply } => {
                debug!("pump: dropping pipeline for recreate");
                config = fresh;
                stream = None;
                fatal = None;
                let _ = reply.send(Ok(()));
            }

            Action::Read { len, reply } => {
                if let Some(msg) = &fatal {
                    let _ = reply.send(Err(EngineError::Worker(msg.clone())));
                    continue;
                }

                if stream.is_none() {
                    // May block reading headers from the source; that is
                    // the whole point of running on this thread.
                    match factory.create(&config, EngineSource { state: state.clone() }) {
                        Ok(s) => stream = Some(s),
                        Err(e) => {
                            error!("pump: pipeline construction failed: {e}");
                            fatal = Some(e.to_string());
                            let _ = reply.send(Err(e));
                            continue;
                        }
                    }
                }

                if let Some(current) = stream.as_mut() {
                    let mut buf = vec![0u8; len];
                    match current.read(&mut buf) {
                        Ok(n) => {
                            buf.truncate(n);
                            let _ = reply.send(Ok(buf));
                        }
                        Err(e) => {
                            error!("pump: pipeline read failed: {e}");
                            fatal = Some(e.to_string());
                            let _ = reply.send(Err(EngineError::Transform(e)));
                        }
                    }
                }
            }
        }
    }
}
