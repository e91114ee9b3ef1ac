//! Ports of the host-framework compressor contract tests: flag transitions,
//! windowed draining, pipeline prelude routing, reinit.

use std::io::Write;

use pullcodec::engine::pipeline::{SinkFactory, SinkPipeline};
use pullcodec::{CodecConfig, EngineError, EngineSink, StreamCompressor};

const HEADER: &[u8] = b"Header";

/// Pass-through pipeline: the raw sink is the whole chain.
struct Identity;

impl SinkFactory for Identity {
    fn create(
        &self,
        _config: &CodecConfig,
        sink: EngineSink,
    ) -> Result<Box<dyn SinkPipeline>, EngineError> {
        Ok(Box::new(sink))
    }
}

/// Writes a fixed prelude during pipeline construction, split across write
/// calls, then passes everything else through.
struct Headed;

impl SinkFactory for Headed {
    fn create(
        &self,
        _config: &CodecConfig,
        mut sink: EngineSink,
    ) -> Result<Box<dyn SinkPipeline>, EngineError> {
        sink.write_all(&HEADER[..3])?;
        sink.write_all(&HEADER[3..])?;
        Ok(Box::new(sink))
    }
}

fn identity() -> StreamCompressor {
    StreamCompressor::new(CodecConfig::default(), Identity).unwrap()
}

#[test]
fn create() {
    let mut c = identity();
    assert!(c.needs_input());
    assert_eq!(0, c.get_bytes_read());
    assert_eq!(0, c.get_bytes_written());
    assert!(!c.finished());
    c.end().unwrap();
}

#[test]
fn set_input() {
    let mut c = identity();
    c.set_input(b"Hello World!");
    assert!(!c.needs_input());
    c.end().unwrap();
}

#[test]
fn finish_alone_is_not_finished() {
    let mut c = identity();
    c.set_input(b"Hello World!");
    c.finish();
    assert!(!c.finished());
    c.end().unwrap();
}

#[test]
fn compress() {
    let mut c = identity();
    let b = b"Hello World!";
    c.set_input(b);
    c.finish();

    // One byte larger to see we don't get garbage.
    let mut buf = vec![0u8; b.len() + 1];
    assert_eq!(b.len(), c.compress(&mut buf).unwrap());
    assert_eq!(b, &buf[..b.len()]);
    assert!(c.finished());
    assert_eq!(b.len() as u64, c.get_bytes_read());
    assert_eq!(b.len() as u64, c.get_bytes_written());
    c.end().unwrap();
}

#[test]
fn compress_twice_with_undersized_window() {
    let mut c = identity();
    let b = b"Hello World!";
    c.set_input(b);
    c.finish();

    let mut buf = vec![0u8; b.len() + 1];
    assert_eq!(6, c.compress(&mut buf[..6]).unwrap());
    assert!(!c.finished());
    let n = c.compress(&mut buf[6..]).unwrap();
    assert_eq!(6, n);
    assert_eq!(b, &buf[..12]);
    assert!(c.finished());
    c.end().unwrap();
}

#[test]
fn set_input_twice() {
    let mut c = identity();
    let b = b"Hello World!";

    c.set_input(&b[..6]);
    let mut buf = vec![0u8; b.len() + 1];
    assert_eq!(6, c.compress(&mut buf).unwrap());
    assert!(c.needs_input());

    c.set_input(&b[6..]);
    c.finish();
    assert_eq!(6, c.compress(&mut buf[6..]).unwrap());
    assert_eq!(b, &buf[..12]);
    c.end().unwrap();
}

#[test]
fn chunking_invariance() {
    // One window vs. two windows must produce identical bytes and counters.
    let whole = {
        let mut c = identity();
        c.set_input(b"Hello World!");
        c.finish();
        let mut buf = vec![0u8; 32];
        let n = c.compress(&mut buf).unwrap();
        let counters = (c.get_bytes_read(), c.get_bytes_written());
        (buf[..n].to_vec(), counters)
    };
    let split = {
        let mut c = identity();
        let mut out = Vec::new();
        let mut buf = vec![0u8; 32];
        for part in [&b"Hello "[..], &b"World!"[..]] {
            c.set_input(part);
            let n = c.compress(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        c.finish();
        while !c.finished() {
            let n = c.compress(&mut buf).unwrap();
            out.extend_from_slice(&buf[..n]);
        }
        (out, (c.get_bytes_read(), c.get_bytes_written()))
    };
    assert_eq!(whole, split);
}

#[test]
fn headed_pipeline_prelude_is_drained_first() {
    let mut c = StreamCompressor::new(CodecConfig::default(), Headed).unwrap();
    let b = b"Hello World!";

    c.set_input(&b[..6]);
    let mut buf = vec![0u8; HEADER.len() + b.len() + 1];
    assert_eq!(HEADER.len() + 6, c.compress(&mut buf).unwrap());

    c.set_input(&b[6..]);
    c.finish();
    let off = HEADER.len() + 6;
    assert_eq!(6, c.compress(&mut buf[off..off + 7]).unwrap());
    assert_eq!(b"HeaderHello World!", &buf[..HEADER.len() + b.len()]);
    c.end().unwrap();
}

#[test]
fn compress_without_input_returns_zero() {
    let mut c = identity();
    let mut buf = [0u8; 8];
    assert_eq!(0, c.compress(&mut buf).unwrap());
    assert!(c.needs_input());
    assert!(!c.finished());
    c.end().unwrap();
}

#[test]
fn zero_length_output_window() {
    let mut c = identity();
    c.set_input(b"abc");
    assert_eq!(0, c.compress(&mut []).unwrap());
    // The window was not consumed: nothing fit.
    assert!(!c.needs_input());
    c.end().unwrap();
}

#[test]
fn reset_behaves_like_fresh_engine() {
    let mut c = identity();
    c.set_input(b"first run");
    c.finish();
    let mut buf = vec![0u8; 32];
    let n = c.compress(&mut buf).unwrap();
    assert_eq!(9, n);
    assert!(c.finished());

    c.reset().unwrap();
    assert!(c.needs_input());
    assert!(!c.finished());
    assert_eq!(0, c.get_bytes_read());
    assert_eq!(0, c.get_bytes_written());

    c.set_input(b"second");
    c.finish();
    let n = c.compress(&mut buf).unwrap();
    assert_eq!(b"second", &buf[..n]);
    assert!(c.finished());
    assert_eq!(6, c.get_bytes_read());
    c.end().unwrap();
}

#[test]
fn reset_discards_undrained_output() {
    let mut c = identity();
    c.set_input(b"Hello World!");
    let mut small = [0u8; 4];
    assert_eq!(4, c.compress(&mut small).unwrap());

    // 8 bytes are still buffered; reset must not leak them.
    c.reset().unwrap();
    c.set_input(b"xy");
    c.finish();
    let mut buf = [0u8; 8];
    let n = c.compress(&mut buf).unwrap();
    assert_eq!(b"xy", &buf[..n]);
    c.end().unwrap();
}

#[test]
fn end_is_idempotent() {
    let mut c = identity();
    c.end().unwrap();
    c.end().unwrap();
}

#[test]
fn dictionaries_are_unsupported() {
    let mut c = identity();
    assert!(!c.needs_dictionary());
    assert!(matches!(
        c.set_dictionary(b"dict"),
        Err(EngineError::Unsupported(_))
    ));
    c.end().unwrap();
}
