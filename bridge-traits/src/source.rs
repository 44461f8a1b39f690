//! Byte source capability.
//!
//! Sources produce the compressed byte stream the pipeline decodes. How the
//! bytes are obtained (HTTP radio fetch, file, memory) is entirely the
//! implementation's business, including reconnecting after transport
//! failures. The pipeline applies backpressure by blocking the source worker
//! on the byte channel, so a source may produce chunks as fast as it likes.

use bytes::Bytes;

/// Trait for producers of compressed audio bytes.
///
/// Driven from the pipeline's source worker thread.
///
/// ## Contract
///
/// - `next_chunk` may block for as long as it needs (network reads,
///   reconnect loops). Transport failures are handled internally.
/// - Returning `None` signals end of stream; the pipeline then drains what
///   is already buffered. A live radio source never returns `None`.
/// - Chunk sizes are unconstrained; the pipeline places no framing
///   requirement on them.
pub trait ByteSource: Send {
    /// Produce the next chunk of compressed bytes, or `None` at end of
    /// stream.
    fn next_chunk(&mut self) -> Option<Bytes>;
}

/// In-memory byte source serving a payload in fixed-size chunks.
///
/// Useful for demos and tests. In looping mode the payload repeats forever
/// and the short tail chunk is zero-padded up to the chunk size, mirroring
/// how an embedded firmware image streams a baked-in sample; in one-shot
/// mode the tail chunk is returned short, followed by `None`.
pub struct MemorySource {
    data: Bytes,
    chunk_size: usize,
    pos: usize,
    looping: bool,
}

impl MemorySource {
    /// Source that plays the payload once and then reports end of stream.
    pub fn once(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self::new(data, chunk_size, false)
    }

    /// Source that wraps back to the start of the payload forever.
    pub fn looping(data: impl Into<Bytes>, chunk_size: usize) -> Self {
        Self::new(data, chunk_size, true)
    }

    fn new(data: impl Into<Bytes>, chunk_size: usize, looping: bool) -> Self {
        let data = data.into();
        assert!(chunk_size > 0, "chunk_size must be nonzero");
        Self {
            data,
            chunk_size,
            pos: 0,
            looping,
        }
    }
}

impl ByteSource for MemorySource {
    fn next_chunk(&mut self) -> Option<Bytes> {
        if self.data.is_empty() {
            return None;
        }
        if self.pos >= self.data.len() {
            if !self.looping {
                return None;
            }
            self.pos = 0;
        }

        let remaining = self.data.len() - self.pos;
        let take = self.chunk_size.min(remaining);
        let chunk = self.data.slice(self.pos..self.pos + take);
        self.pos += take;

        if self.looping && take < self.chunk_size {
            // Pad the wrap-around tail so every chunk has the same size.
            let mut padded = Vec::with_capacity(self.chunk_size);
            padded.extend_from_slice(&chunk);
            padded.resize(self.chunk_size, 0);
            return Some(Bytes::from(padded));
        }

        Some(chunk)
    }
}
