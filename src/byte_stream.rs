//! A bounded, in-order, single-producer/single-consumer byte pipe.
//!
//! One side pushes bytes in and can close the stream; the other side peeks
//! and pops bytes out, in order, and can flag the stream as errored. Both
//! halves live on the same `ByteStream` since this crate never needs to hand
//! reader and writer to different owners -- a `TCPSender` or `Reassembler`
//! holds the whole thing.

use std::collections::VecDeque;

/// A fixed-capacity byte pipe.
///
/// Backed by a `VecDeque<u8>` rather than a hand-rolled ring buffer:
/// `VecDeque::as_slices` already gives the "oldest contiguous run, which may
/// be shorter than the full buffered amount" view that `peek` needs to
/// expose when the underlying storage wraps.
#[derive(Debug)]
pub struct ByteStream {
    capacity: usize,
    buffer: VecDeque<u8>,
    bytes_pushed: u64,
    bytes_popped: u64,
    closed: bool,
    error: bool,
}

impl ByteStream {
    pub fn new(capacity: usize) -> Self {
        ByteStream {
            capacity,
            buffer: VecDeque::with_capacity(capacity),
            bytes_pushed: 0,
            bytes_popped: 0,
            closed: false,
            error: false,
        }
    }

    // -- writer side --------------------------------------------------

    /// Append as much of `data` as fits in the remaining capacity. Silently
    /// drops the rest. Silently does nothing once closed.
    pub fn push(&mut self, data: &[u8]) {
        if self.closed {
            return; // wrong, but silence: matches the original's documented behavior
        }
        let to_write = data.len().min(self.available_capacity());
        self.buffer.extend(&data[..to_write]);
        self.bytes_pushed += to_write as u64;
    }

    pub fn close(&mut self) {
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    pub fn available_capacity(&self) -> usize {
        self.capacity - self.buffer.len()
    }

    pub fn bytes_pushed(&self) -> u64 {
        self.bytes_pushed
    }

    // -- reader side ---------------------------------------------------

    /// The oldest contiguous run of buffered bytes. Empty when nothing is
    /// buffered; shorter than `bytes_buffered` when the ring has wrapped.
    pub fn peek(&self) -> &[u8] {
        self.buffer.as_slices().0
    }

    /// Remove `len` bytes from the front. `len` greater than what's
    /// buffered is a programming error.
    pub fn pop(&mut self, len: usize) {
        let buffered = self.bytes_buffered();
        assert!(len <= buffered, "not enough bytes to pop");
        self.buffer.drain(..len);
        self.bytes_popped += len as u64;
    }

    /// Pop and return up to `max_len` bytes, regardless of how the ring
    /// buffer's contents are physically laid out.
    pub fn read(&mut self, max_len: usize) -> Vec<u8> {
        let len = max_len.min(self.bytes_buffered());
        let out: Vec<u8> = self.buffer.drain(..len).collect();
        self.bytes_popped += len as u64;
        out
    }

    pub fn bytes_buffered(&self) -> usize {
        self.buffer.len()
    }

    pub fn bytes_popped(&self) -> u64 {
        self.bytes_popped
    }

    pub fn is_finished(&self) -> bool {
        self.closed && self.buffer.is_empty()
    }

    pub fn has_error(&self) -> bool {
        self.error
    }

    pub fn set_error(&mut self) {
        self.error = true;
    }
}
