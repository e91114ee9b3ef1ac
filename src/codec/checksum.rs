//! codec/checksum.rs
//! CRC32 accounting wrappers, layered into pipeline chains when the
//! configuration asks for them. These do not verify anything on their own;
//! they keep a running digest and byte count of everything passing through,
//! for end-to-end accounting in logs and tests.

use std::io::{self, Read, Write};

use crc32fast::Hasher;
use log::debug;

use crate::engine::pipeline::SinkPipeline;

/// Transparent `Write` wrapper digesting everything written through it.
pub struct Crc32Writer<W> {
    inner: W,
    hasher: Hasher,
    count: u64,
}

impl<W> Crc32Writer<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, hasher: Hasher::new(), count: 0 }
    }

    /// CRC32 of the bytes written so far.
    pub fn digest(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<W: Write> Write for Crc32Writer<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = self.inner.write(buf)?;
        self.hasher.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

impl<W: SinkPipeline> SinkPipeline for Crc32Writer<W> {
    fn finish(&mut self) -> io::Result<()> {
        debug!(
            "sink checksum: crc32=0x{:08x} over {} bytes",
            self.digest(),
            self.count
        );
        self.inner.finish()
    }
}

/// Transparent `Read` wrapper digesting everything read through it.
pub struct Crc32Reader<R> {
    inner: R,
    hasher: Hasher,
    count: u64,
}

impl<R> Crc32Reader<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, hasher: Hasher::new(), count: 0 }
    }

    /// CRC32 of the bytes read so far.
    pub fn digest(&self) -> u32 {
        self.hasher.clone().finalize()
    }

    pub fn count(&self) -> u64 {
        self.count
    }
}

impl<R: Read> Read for Crc32Reader<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.hasher.update(&buf[..n]);
        self.count += n as u64;
        Ok(n)
    }
}
