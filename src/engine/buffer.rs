//! engine/buffer.rs
//! Growable FIFO byte store used by the compressor to hold pipeline output
//! the caller has not pulled yet.
//!
//! Deliberately not a ring buffer: buffered spans are expected to be small
//! and short-lived, so doubling plus full front-compaction keeps the code
//! simple. Unbounded; bounding is the caller's job via adequately sized
//! output windows.

/// Unread bytes live at `bytes[off..off + len]`; `off + len <= capacity`.
#[derive(Debug)]
pub struct GrowableBuffer {
    bytes: Vec<u8>,
    off: usize,
    len: usize,
}

impl GrowableBuffer {
    pub fn with_capacity(initial: usize) -> Self {
        Self {
            // Capacity 0 would make doubling a no-op.
            bytes: vec![0u8; initial.max(1)],
            off: 0,
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Append `data` after the unread bytes, growing or compacting first so
    /// the write always lands in a contiguous tail.
    pub fn append(&mut self, data: &[u8]) {
        if data.is_empty() {
            return;
        }

        if self.len + data.len() > self.bytes.len() {
            // Allocate the smallest power-of-two multiple of the current
            // capacity that fits, moving unread bytes to the front.
            let mut cap = self.bytes.len() * 2;
            while cap < self.len + data.len() {
                cap *= 2;
            }

            let mut fresh = vec![0u8; cap];
            fresh[..self.len].copy_from_slice(&self.bytes[self.off..self.off + self.len]);
            self.bytes = fresh;
            self.off = 0;
        } else if self.off > 0 {
            // Shift unread bytes to the beginning; no ring buffer here.
            self.bytes.copy_within(self.off..self.off + self.len, 0);
            self.off = 0;
        }

        self.bytes[self.len..self.len + data.len()].copy_from_slice(data);
        self.len += data.len();
    }

    /// Copy up to `out.len()` bytes from the front into `out`, removing them.
    /// Returns the number of bytes copied.
    pub fn drain_into(&mut self, out: &mut [u8]) -> usize {
        let n = out.len().min(self.len);
        out[..n].copy_from_slice(&self.bytes[self.off..self.off + n]);
        self.off += n;
        self.len -= n;
        if self.len == 0 {
            self.off = 0;
        }
        n
    }

    pub fn clear(&mut self) {
        self.off = 0;
        self.len = 0;
    }
}
