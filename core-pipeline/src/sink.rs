//! # Sink Transformer
//!
//! The sink worker: waits for a decoded PCM frame, reshapes it for the
//! output transport, and writes it to the hardware output capability.
//!
//! A zero-length frame marks a sync-loss cycle; the sink skips the write but
//! still returns the frame so the decoder can proceed (a stalled handshake
//! would stall the whole pipeline).

use crate::diag::PipelineDiagnostics;
use crate::frame::PcmFrame;
use crate::handoff::FrameConsumer;
use bridge_traits::output::AudioOutput;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Downmix interleaved stereo samples to mono in place, keeping the left
/// channel. Returns the new valid length (`len / 2`).
pub fn downmix_to_mono(samples: &mut [i16], len: usize) -> usize {
    let out_len = len / 2;
    for i in 0..out_len {
        samples[i] = samples[2 * i];
    }
    out_len
}

/// Swap adjacent sample pairs in place, the word order the output transport
/// expects. An unpaired final sample is left where it is.
pub fn swap_adjacent_pairs(samples: &mut [i16], len: usize) {
    let mut i = 0;
    while i + 1 < len {
        samples.swap(i, i + 1);
        i += 2;
    }
}

/// Reshape a decoded frame for the output device: stereo input is downmixed
/// to mono, and the result gets the transport's pair-swapped sample order.
/// Mono input only gets the pair swap.
pub fn reorder_for_output(frame: &mut PcmFrame) {
    let channels = frame.info().map(|info| info.channels).unwrap_or(2);
    let mut len = frame.len();

    if channels >= 2 {
        len = downmix_to_mono(frame.samples_mut(), len);
        frame.set_len(len);
    }
    swap_adjacent_pairs(frame.samples_mut(), len);
}

/// Cumulative sink throughput, measured from the first nonzero write.
#[derive(Debug, Default)]
struct ThroughputStats {
    bytes_written: u64,
    started_at: Option<Instant>,
}

impl ThroughputStats {
    fn record(&mut self, bytes: usize) {
        if bytes == 0 {
            return;
        }
        if self.started_at.is_none() {
            self.started_at = Some(Instant::now());
        }
        self.bytes_written += bytes as u64;
    }

    fn report(&self) -> Option<(u64, u64, u64)> {
        let elapsed_sec = self.started_at?.elapsed().as_secs();
        if elapsed_sec == 0 {
            return None;
        }
        Some((
            self.bytes_written,
            elapsed_sec,
            self.bytes_written / elapsed_sec,
        ))
    }
}

/// The sink worker.
pub struct SinkWorker<O: AudioOutput> {
    frames: FrameConsumer,
    output: O,
    /// Reusable little-endian byte image of the frame being written.
    scratch: Vec<u8>,
    stats: ThroughputStats,
    report_interval: u64,
    cycles: u64,
    diagnostics: Arc<PipelineDiagnostics>,
}

impl<O: AudioOutput> SinkWorker<O> {
    pub fn new(
        frames: FrameConsumer,
        output: O,
        report_interval: u64,
        diagnostics: Arc<PipelineDiagnostics>,
    ) -> Self {
        Self {
            frames,
            output,
            scratch: Vec::new(),
            stats: ThroughputStats::default(),
            report_interval,
            cycles: 0,
            diagnostics,
        }
    }

    /// Run the worker loop. Never returns.
    pub fn run(mut self) {
        debug!("Starting sink worker");
        loop {
            self.cycle();
        }
    }

    pub(crate) fn cycle(&mut self) {
        let mut frame = self.frames.acquire();

        if !frame.is_empty() {
            reorder_for_output(&mut frame);
            self.write_frame(&frame);
        }

        self.frames.release(frame);

        self.cycles += 1;
        if self.cycles % self.report_interval == 0 {
            if let Some((total, seconds, rate)) = self.stats.report() {
                debug!(
                    bytes_written = total,
                    elapsed_sec = seconds,
                    bytes_per_sec = rate,
                    "sink throughput"
                );
            }
        }
    }

    /// Write the frame's bytes to the device, retrying partial writes until
    /// done. A device error drops the rest of this frame; the pipeline keeps
    /// going.
    fn write_frame(&mut self, frame: &PcmFrame) {
        self.scratch.clear();
        for &sample in frame.samples() {
            self.scratch.extend_from_slice(&sample.to_le_bytes());
        }

        let mut written = 0;
        while written < self.scratch.len() {
            match self.output.write(&self.scratch[written..]) {
                Ok(n) => written += n,
                Err(e) => {
                    warn!(
                        written,
                        dropped = self.scratch.len() - written,
                        error = %e,
                        "output write failed; dropping rest of frame"
                    );
                    break;
                }
            }
        }

        self.stats.record(written);
        self.diagnostics.add_bytes_written(written as u64);
    }
}
