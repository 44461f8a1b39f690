//! # Stream Synchronizer
//!
//! The decoder worker: pulls compressed bytes from the byte channel into a
//! private staging buffer, drives the frame decoder against it, and tracks
//! whether the pipeline is locked onto true frame boundaries.
//!
//! ## State machine
//!
//! Two states with the staging buffer as the only memory across cycles:
//!
//! - **Seeking** - no frame has decoded since start or the last loss. Fills
//!   are blocking and insist on a large staged amount before decoding, so
//!   the bounded retry loop has enough bytes to find the next frame boundary
//!   instead of spinning on short reads.
//! - **Locked** - frames are decoding at the stream cadence. Fills are a
//!   single best-effort non-blocking pull; decoding proceeds even if the
//!   staging buffer runs low.
//!
//! A cycle that decodes a frame (re)enters Locked; exhausting the retry
//! budget flushes the staging buffer, publishes an empty frame and drops to
//! Seeking. The transition table is [`next_state`].

use crate::byte_channel::{ChannelConsumer, PullMode};
use crate::config::PipelineConfig;
use crate::diag::{self, PipelineDiagnostics};
use crate::frame::PcmFrame;
use crate::handoff::FrameProducer;
use bridge_traits::decoder::{FrameDecoder, FrameInfo};
use std::sync::Arc;
use tracing::{debug, error, trace};

/// Synchronization state of the decoder against the byte stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No frame has decoded since start or the last loss of sync.
    Seeking,
    /// The stream is tracking frame boundaries.
    Locked,
}

/// Outcome of one decode-with-retry pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeOutcome {
    /// A frame was decoded within the retry budget.
    FrameDecoded,
    /// The retry budget was exhausted without producing samples.
    SyncLost,
}

/// Transition table of the synchronizer state machine.
pub fn next_state(current: SyncState, outcome: DecodeOutcome) -> SyncState {
    match (current, outcome) {
        (SyncState::Seeking, DecodeOutcome::FrameDecoded) => SyncState::Locked,
        (SyncState::Locked, DecodeOutcome::FrameDecoded) => SyncState::Locked,
        (SyncState::Seeking, DecodeOutcome::SyncLost) => SyncState::Seeking,
        (SyncState::Locked, DecodeOutcome::SyncLost) => SyncState::Seeking,
    }
}

/// Staging buffer for compressed bytes awaiting a successful decode.
///
/// Exclusively owned by the synchronizer, never shared. A successful (or
/// skipping) decode consumes a prefix; the remainder is compacted to the
/// front.
pub struct StagingBuffer {
    buf: Box<[u8]>,
    len: usize,
}

impl StagingBuffer {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "staging capacity must be nonzero");
        Self {
            buf: vec![0u8; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    pub fn capacity(&self) -> usize {
        self.buf.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn free_space(&self) -> usize {
        self.buf.len() - self.len
    }

    /// The staged bytes.
    pub fn bytes(&self) -> &[u8] {
        &self.buf[..self.len]
    }

    /// Pull up to `max` bytes from the channel directly into the free tail.
    pub fn append_from(&mut self, channel: &ChannelConsumer, max: usize, mode: PullMode) -> usize {
        let max = max.min(self.free_space());
        if max == 0 {
            return 0;
        }
        let start = self.len;
        let pulled = channel.pull(&mut self.buf[start..start + max], mode);
        self.len += pulled;
        pulled
    }

    /// Remove `n` bytes from the front, compacting the remainder.
    ///
    /// Clamped to the occupied length so a decoder over-reporting its
    /// consumption can never underflow the buffer. Returns the count
    /// actually removed.
    pub fn consume(&mut self, n: usize) -> usize {
        let n = n.min(self.len);
        if n == 0 {
            return 0;
        }
        self.buf.copy_within(n..self.len, 0);
        self.len -= n;
        n
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }
}

/// The decoder worker.
pub struct Synchronizer<D: FrameDecoder> {
    channel: ChannelConsumer,
    frames: FrameProducer,
    decoder: D,
    staging: StagingBuffer,
    state: SyncState,
    sync_fill_threshold: usize,
    max_decode_retries: u32,
    /// Wrapping byte position in the stream, diagnostics only.
    position: u64,
    last_info: Option<FrameInfo>,
    diagnostics: Arc<PipelineDiagnostics>,
}

impl<D: FrameDecoder> Synchronizer<D> {
    pub fn new(
        channel: ChannelConsumer,
        frames: FrameProducer,
        decoder: D,
        config: &PipelineConfig,
        diagnostics: Arc<PipelineDiagnostics>,
    ) -> Self {
        Self {
            channel,
            frames,
            decoder,
            staging: StagingBuffer::new(config.staging_capacity),
            state: SyncState::Seeking,
            sync_fill_threshold: config.sync_fill_threshold,
            max_decode_retries: config.max_decode_retries,
            position: 0,
            last_info: None,
            diagnostics,
        }
    }

    /// Run the worker loop. Never returns while the stream is live; once the
    /// channel is closed and fully drained the worker parks, keeping its
    /// final state observable.
    pub fn run(mut self) {
        debug!("Starting decoder worker");
        loop {
            self.fill();
            if self.drained() {
                debug!("byte stream drained; decoder worker parking");
                loop {
                    std::thread::park();
                }
            }
            self.exchange();
        }
    }

    /// One full pipeline cycle: fill, wait for the PCM slot, decode with
    /// retry, publish.
    pub(crate) fn cycle(&mut self) {
        self.fill();
        self.exchange();
    }

    /// Whether the source has ended and every byte has been decoded or
    /// discarded.
    fn drained(&self) -> bool {
        self.staging.is_empty() && self.channel.is_closed() && self.channel.occupied() == 0
    }

    /// Handshake half of the cycle: wait for the PCM slot, decode with
    /// retry, publish.
    fn exchange(&mut self) {
        let mut frame = self.frames.acquire();
        let outcome = self.decode_into(&mut frame);
        self.state = next_state(self.state, outcome);
        self.diagnostics.set_state(self.state);
        self.frames.publish(frame);
    }

    /// Fill phase. Seeking insists on `sync_fill_threshold` staged bytes
    /// (blocking pulls); Locked takes whatever is available right now.
    fn fill(&mut self) {
        match self.state {
            SyncState::Seeking => {
                while self.staging.len() < self.sync_fill_threshold {
                    let max = self.staging.free_space().min(self.sync_fill_threshold);
                    if max == 0 {
                        break;
                    }
                    let pulled = self.staging.append_from(&self.channel, max, PullMode::Blocking);
                    if pulled == 0 {
                        // Channel closed and drained; decode what we have.
                        break;
                    }
                }
            }
            SyncState::Locked => {
                let free = self.staging.free_space();
                if free > 0 {
                    self.staging.append_from(&self.channel, free, PullMode::NonBlocking);
                }
            }
        }
    }

    /// Decode-with-retry against the staging buffer, writing into `frame`.
    fn decode_into(&mut self, frame: &mut PcmFrame) -> DecodeOutcome {
        let mut attempts_left = self.max_decode_retries;

        loop {
            if self.state == SyncState::Seeking && self.staging.is_empty() {
                // Nothing staged to search through.
                return self.lose_sync(frame);
            }

            let result = self
                .decoder
                .decode_frame(self.staging.bytes(), frame.samples_mut());

            let consumed = result.bytes_consumed.min(self.staging.len());
            let frame_ck = if result.samples > 0 {
                diag::checksum(&self.staging.bytes()[..consumed])
            } else {
                0
            };
            self.staging.consume(consumed);
            self.position = self.position.wrapping_add(consumed as u64);
            self.diagnostics.add_bytes_consumed(consumed as u64);

            if result.samples > 0 {
                return self.lock(frame, result.samples, result.info, consumed, frame_ck);
            }

            attempts_left -= 1;
            if attempts_left == 0 {
                return self.lose_sync(frame);
            }
        }
    }

    fn lock(
        &mut self,
        frame: &mut PcmFrame,
        samples: usize,
        info: FrameInfo,
        frame_bytes: usize,
        frame_ck: u16,
    ) -> DecodeOutcome {
        if self.last_info != Some(info) {
            debug!(
                channels = info.channels,
                sample_rate = info.sample_rate,
                bitrate_kbps = info.bitrate_kbps,
                "stream locked"
            );
            self.last_info = Some(info);
        }

        frame.set_len(samples);
        frame.set_info(info);
        self.diagnostics.record_frame(info);

        trace!(
            frame_bytes,
            samples,
            position = self.position,
            in_ck = frame_ck,
            next_ck = diag::checksum(&self.staging.bytes()[..self.staging.len().min(500)]),
            out_ck = diag::pcm_checksum(frame.samples()),
            "decoded frame"
        );

        DecodeOutcome::FrameDecoded
    }

    fn lose_sync(&mut self, frame: &mut PcmFrame) -> DecodeOutcome {
        error!(position = self.position, "lost stream sync; flushing staging buffer");
        self.staging.clear();
        frame.clear();
        self.diagnostics.record_sync_loss();
        DecodeOutcome::SyncLost
    }

    #[cfg(test)]
    fn state(&self) -> SyncState {
        self.state
    }

    #[cfg(test)]
    fn staging(&self) -> &StagingBuffer {
        &self.staging
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::byte_channel;
    use crate::handoff::frame_handoff;
    use bridge_traits::decoder::DecodeResult;
    use std::collections::VecDeque;

    /// Decoder stub that replays a script of (samples, bytes_consumed)
    /// pairs, then reports (0, 0) forever.
    struct ScriptedDecoder {
        script: VecDeque<(usize, usize)>,
        info: FrameInfo,
        calls: usize,
    }

    impl ScriptedDecoder {
        fn new(script: &[(usize, usize)]) -> Self {
            Self {
                script: script.iter().copied().collect(),
                info: FrameInfo::new(2, 44100, 128),
                calls: 0,
            }
        }
    }

    impl FrameDecoder for ScriptedDecoder {
        fn decode_frame(&mut self, _input: &[u8], output: &mut [i16]) -> DecodeResult {
            self.calls += 1;
            let (samples, bytes_consumed) = self.script.pop_front().unwrap_or((0, 0));
            for slot in output.iter_mut().take(samples) {
                *slot = self.calls as i16;
            }
            DecodeResult {
                samples,
                bytes_consumed,
                info: self.info,
            }
        }
    }

    fn synchronizer_with(
        decoder: ScriptedDecoder,
        config: &PipelineConfig,
        staged: &[u8],
    ) -> Synchronizer<ScriptedDecoder> {
        let (producer, consumer) = byte_channel::bounded(config.channel_capacity);
        producer.push(staged);
        drop(producer);

        let (frames, _sink_side) = frame_handoff(PcmFrame::new());

        let mut sync = Synchronizer::new(
            consumer,
            frames,
            decoder,
            config,
            Arc::new(PipelineDiagnostics::default()),
        );
        let staged_len = staged.len();
        sync.staging
            .append_from(&sync.channel, staged_len, PullMode::NonBlocking);
        sync
    }

    #[test]
    fn test_transition_table() {
        use DecodeOutcome::*;
        use SyncState::*;

        assert_eq!(next_state(Seeking, FrameDecoded), Locked);
        assert_eq!(next_state(Locked, FrameDecoded), Locked);
        assert_eq!(next_state(Seeking, SyncLost), Seeking);
        assert_eq!(next_state(Locked, SyncLost), Seeking);
    }

    #[test]
    fn test_staging_compaction_is_exact() {
        let mut staging = StagingBuffer::new(8);
        let (producer, consumer) = byte_channel::bounded(8);
        producer.push(&[1, 2, 3, 4, 5, 6]);

        assert_eq!(staging.append_from(&consumer, 6, PullMode::NonBlocking), 6);
        assert_eq!(staging.consume(2), 2);
        // Remainder compacted to the front, no gaps.
        assert_eq!(staging.bytes(), &[3, 4, 5, 6]);
        assert_eq!(staging.free_space(), 4);
    }

    #[test]
    fn test_staging_consume_clamps() {
        let mut staging = StagingBuffer::new(8);
        let (producer, consumer) = byte_channel::bounded(8);
        producer.push(&[1, 2, 3]);
        staging.append_from(&consumer, 3, PullMode::NonBlocking);

        // A decoder reporting more than staged must not underflow.
        assert_eq!(staging.consume(staging.len() + 10), 3);
        assert!(staging.is_empty());
    }

    #[test]
    fn test_retries_exhausted_loses_sync() {
        let retries = 10;
        let mut config = PipelineConfig::small_buffers();
        config.max_decode_retries = retries;

        // Always skips one garbage byte without producing samples.
        let script: Vec<(usize, usize)> = (0..retries).map(|_| (0, 1)).collect();
        let decoder = ScriptedDecoder::new(&script);
        let mut sync = synchronizer_with(decoder, &config, &[0xAAu8; 64]);

        let mut frame = PcmFrame::new();
        let outcome = sync.decode_into(&mut frame);

        assert_eq!(outcome, DecodeOutcome::SyncLost);
        assert_eq!(sync.decoder.calls, retries as usize);
        assert_eq!(sync.staging().len(), 0);
        assert!(frame.is_empty());

        sync.state = next_state(sync.state, outcome);
        assert_eq!(sync.state(), SyncState::Seeking);
    }

    #[test]
    fn test_first_attempt_success_locks() {
        let config = PipelineConfig::small_buffers();
        let decoder = ScriptedDecoder::new(&[(96, 40)]);
        let staged: Vec<u8> = (0..64u8).collect();
        let mut sync = synchronizer_with(decoder, &config, &staged);

        let before = sync.staging().len();
        let mut frame = PcmFrame::new();
        let outcome = sync.decode_into(&mut frame);

        assert_eq!(outcome, DecodeOutcome::FrameDecoded);
        assert_eq!(frame.len(), 96);
        assert_eq!(frame.info(), Some(FrameInfo::new(2, 44100, 128)));
        // Staging shrank by exactly the consumed count, prefix intact.
        assert_eq!(sync.staging().len(), before - 40);
        assert_eq!(sync.staging().bytes()[0], 40);

        sync.state = next_state(sync.state, outcome);
        assert_eq!(sync.state(), SyncState::Locked);
    }

    #[test]
    fn test_garbage_skip_then_frame() {
        let config = PipelineConfig::small_buffers();
        // Two skipping attempts, then a frame.
        let decoder = ScriptedDecoder::new(&[(0, 7), (0, 5), (1152, 20)]);
        let mut sync = synchronizer_with(decoder, &config, &[0u8; 64]);

        let mut frame = PcmFrame::new();
        let outcome = sync.decode_into(&mut frame);

        assert_eq!(outcome, DecodeOutcome::FrameDecoded);
        assert_eq!(frame.len(), 1152);
        assert_eq!(sync.staging().len(), 64 - 7 - 5 - 20);
    }

    #[test]
    fn test_seeking_with_empty_staging_is_sync_loss() {
        let config = PipelineConfig::small_buffers();
        let decoder = ScriptedDecoder::new(&[]);
        let mut sync = synchronizer_with(decoder, &config, &[]);

        let mut frame = PcmFrame::new();
        frame.set_len(5);
        let outcome = sync.decode_into(&mut frame);

        assert_eq!(outcome, DecodeOutcome::SyncLost);
        // The stale frame content was invalidated.
        assert!(frame.is_empty());
        // No decode attempt was made on the empty buffer.
        assert_eq!(sync.decoder.calls, 0);
    }

    #[test]
    fn test_position_counter_accumulates_consumption() {
        let config = PipelineConfig::small_buffers();
        let decoder = ScriptedDecoder::new(&[(0, 3), (10, 9)]);
        let mut sync = synchronizer_with(decoder, &config, &[0u8; 32]);

        let mut frame = PcmFrame::new();
        sync.decode_into(&mut frame);
        assert_eq!(sync.position, 12);
        assert_eq!(sync.diagnostics.snapshot().bytes_consumed, 12);
    }
}
