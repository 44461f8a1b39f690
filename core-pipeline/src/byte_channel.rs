//! # Compressed Byte Channel
//!
//! Bounded circular byte buffer connecting the source worker (producer) to
//! the decoder worker (consumer).
//!
//! ## Design
//!
//! - **Atomic push**: a push either enqueues the whole slice or blocks until
//!   it can; the consumer never observes a torn chunk.
//! - **Pull modes**: non-blocking (best effort, used while the decoder is
//!   locked) and blocking (waits for at least one byte, used while seeking).
//! - **Backpressure**: a full channel parks the producer, throttling the
//!   byte source when downstream is slow.
//! - **Drain**: dropping or closing the producer lets blocking pulls return
//!   what remains and then zero, so finite sources can drain the pipeline.
//!
//! The channel knows nothing about audio semantics; it moves bytes.

use parking_lot::{Condvar, Mutex};
use std::sync::Arc;

/// How a pull behaves when the channel is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PullMode {
    /// Return immediately with whatever is available (possibly nothing).
    NonBlocking,
    /// Wait until at least one byte is available, or the channel is closed
    /// and drained.
    Blocking,
}

struct RingState {
    buf: Box<[u8]>,
    read_pos: usize,
    len: usize,
    closed: bool,
}

struct Inner {
    state: Mutex<RingState>,
    capacity: usize,
    not_empty: Condvar,
    not_full: Condvar,
}

/// Create a bounded byte channel with the given capacity.
pub fn bounded(capacity: usize) -> (ChannelProducer, ChannelConsumer) {
    assert!(capacity > 0, "channel capacity must be nonzero");

    let inner = Arc::new(Inner {
        state: Mutex::new(RingState {
            buf: vec![0u8; capacity].into_boxed_slice(),
            read_pos: 0,
            len: 0,
            closed: false,
        }),
        capacity,
        not_empty: Condvar::new(),
        not_full: Condvar::new(),
    });

    (
        ChannelProducer {
            inner: Arc::clone(&inner),
        },
        ChannelConsumer { inner },
    )
}

/// Producer half of the byte channel.
pub struct ChannelProducer {
    inner: Arc<Inner>,
}

impl ChannelProducer {
    /// Enqueue the whole slice, blocking while it does not fit.
    ///
    /// The push is atomic from the consumer's perspective. Pushing a slice
    /// larger than the channel capacity is a producer bug and panics.
    /// Pushing into a closed channel drops the bytes.
    pub fn push(&self, bytes: &[u8]) {
        assert!(
            bytes.len() <= self.inner.capacity,
            "push of {} bytes exceeds channel capacity {}",
            bytes.len(),
            self.inner.capacity
        );
        if bytes.is_empty() {
            return;
        }

        let mut state = self.inner.state.lock();
        while self.inner.capacity - state.len < bytes.len() {
            if state.closed {
                return;
            }
            self.inner.not_full.wait(&mut state);
        }
        if state.closed {
            return;
        }

        let capacity = self.inner.capacity;
        let write_pos = (state.read_pos + state.len) % capacity;
        let first = bytes.len().min(capacity - write_pos);
        state.buf[write_pos..write_pos + first].copy_from_slice(&bytes[..first]);
        state.buf[..bytes.len() - first].copy_from_slice(&bytes[first..]);
        state.len += bytes.len();

        drop(state);
        self.inner.not_empty.notify_one();
    }

    /// Mark the channel closed. Idempotent; also performed on drop.
    pub fn close(&self) {
        let mut state = self.inner.state.lock();
        state.closed = true;
        drop(state);
        self.inner.not_empty.notify_all();
        self.inner.not_full.notify_all();
    }

    /// Total capacity of the channel in bytes.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }
}

impl Drop for ChannelProducer {
    fn drop(&mut self) {
        self.close();
    }
}

/// Consumer half of the byte channel.
pub struct ChannelConsumer {
    inner: Arc<Inner>,
}

impl ChannelConsumer {
    /// Dequeue up to `out.len()` bytes into `out`, returning the count.
    ///
    /// The copy into the caller's buffer is the ownership handback: once
    /// `pull` returns, the channel slots are reusable.
    pub fn pull(&self, out: &mut [u8], mode: PullMode) -> usize {
        if out.is_empty() {
            return 0;
        }

        let mut state = self.inner.state.lock();
        if mode == PullMode::Blocking {
            while state.len == 0 && !state.closed {
                self.inner.not_empty.wait(&mut state);
            }
        }

        let capacity = self.inner.capacity;
        let n = out.len().min(state.len);
        let first = n.min(capacity - state.read_pos);
        out[..first].copy_from_slice(&state.buf[state.read_pos..state.read_pos + first]);
        out[first..n].copy_from_slice(&state.buf[..n - first]);
        state.read_pos = (state.read_pos + n) % capacity;
        state.len -= n;

        drop(state);
        if n > 0 {
            self.inner.not_full.notify_one();
        }
        n
    }

    /// Number of bytes currently enqueued.
    pub fn occupied(&self) -> usize {
        self.inner.state.lock().len
    }

    /// Number of bytes that can be pushed without blocking.
    pub fn free_space(&self) -> usize {
        let state = self.inner.state.lock();
        self.inner.capacity - state.len
    }

    /// Total capacity of the channel in bytes.
    pub fn capacity(&self) -> usize {
        self.inner.capacity
    }

    /// Whether the producer has closed the channel.
    pub fn is_closed(&self) -> bool {
        self.inner.state.lock().closed
    }
}
