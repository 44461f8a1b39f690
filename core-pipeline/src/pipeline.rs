//! # Pipeline Orchestrator
//!
//! Wires the byte channel, the seeded frame handoff and the three workers,
//! then starts them as named OS threads.
//!
//! ```text
//! ┌──────────────────────────────┐
//! │     source worker            │  ByteSource::next_chunk()
//! └────────────┬─────────────────┘
//!              │ compressed bytes (bounded channel, backpressure)
//!              ▼
//! ┌──────────────────────────────┐
//! │     decoder worker           │  Synchronizer + FrameDecoder
//! └────────────┬─────────────────┘
//!              │ one PcmFrame in flight (rendezvous handoff)
//!              ▼
//! ┌──────────────────────────────┐
//! │     sink worker              │  transform + AudioOutput::write()
//! └──────────────────────────────┘
//! ```
//!
//! Spawn order is sink, decoder, source: the consumers are parked on their
//! rendezvous before bytes start flowing, and the handoff is created with
//! the frame token in the slot-free cell, which kicks the decoder's first
//! cycle. The sink has the tightest deadline; all workers park at their
//! suspension points, so relative scheduling is left to the OS.

use crate::byte_channel::{self, ChannelProducer};
use crate::config::PipelineConfig;
use crate::diag::PipelineDiagnostics;
use crate::error::{PipelineError, Result};
use crate::frame::PcmFrame;
use crate::handoff::frame_handoff;
use crate::sink::SinkWorker;
use crate::synchronizer::Synchronizer;
use bridge_traits::decoder::FrameDecoder;
use bridge_traits::output::AudioOutput;
use bridge_traits::source::ByteSource;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, info};

/// A running pipeline: three workers and the shared diagnostics handle.
///
/// The workers run for the life of the process; there is no steady-state
/// cancellation. Dropping `Pipeline` detaches them.
pub struct Pipeline {
    diagnostics: Arc<PipelineDiagnostics>,
    source: JoinHandle<()>,
    _decoder: JoinHandle<()>,
    _sink: JoinHandle<()>,
}

impl Pipeline {
    /// Build and start the pipeline.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or a worker thread
    /// cannot be created. Both are fatal: a half-initialized pipeline cannot
    /// safely hand off buffers, so the caller should halt.
    pub fn spawn<S, D, O>(
        source: S,
        decoder: D,
        output: O,
        config: PipelineConfig,
    ) -> Result<Pipeline>
    where
        S: ByteSource + 'static,
        D: FrameDecoder + 'static,
        O: AudioOutput + 'static,
    {
        config.validate().map_err(PipelineError::Config)?;

        let (byte_tx, byte_rx) = byte_channel::bounded(config.channel_capacity);
        // Seeding the handoff with the frame token is the first kick: the
        // decoder's first acquire() succeeds immediately.
        let (frame_tx, frame_rx) = frame_handoff(PcmFrame::new());
        let diagnostics = Arc::new(PipelineDiagnostics::default());

        let sink_worker = SinkWorker::new(
            frame_rx,
            output,
            config.throughput_report_interval,
            Arc::clone(&diagnostics),
        );
        let sink = thread::Builder::new()
            .name("sink".into())
            .stack_size(config.sink_stack_bytes)
            .spawn(move || sink_worker.run())
            .map_err(|source| PipelineError::WorkerSpawn {
                worker: "sink",
                source,
            })?;

        let synchronizer = Synchronizer::new(
            byte_rx,
            frame_tx,
            decoder,
            &config,
            Arc::clone(&diagnostics),
        );
        let decoder = thread::Builder::new()
            .name("decoder".into())
            .stack_size(config.decoder_stack_bytes)
            .spawn(move || synchronizer.run())
            .map_err(|source| PipelineError::WorkerSpawn {
                worker: "decoder",
                source,
            })?;

        let source = thread::Builder::new()
            .name("source".into())
            .stack_size(config.source_stack_bytes)
            .spawn(move || run_source(source, byte_tx))
            .map_err(|source| PipelineError::WorkerSpawn {
                worker: "source",
                source,
            })?;

        info!("pipeline started");
        Ok(Pipeline {
            diagnostics,
            source,
            _decoder: decoder,
            _sink: sink,
        })
    }

    /// Shared observability handle.
    pub fn diagnostics(&self) -> Arc<PipelineDiagnostics> {
        Arc::clone(&self.diagnostics)
    }

    /// Whether the source worker has finished (its `ByteSource` reported end
    /// of stream). Always `false` for live sources.
    pub fn source_finished(&self) -> bool {
        self.source.is_finished()
    }
}

/// Source worker loop: feed chunks into the channel until the source ends.
///
/// Chunks larger than the channel capacity are pushed in capacity-sized
/// pieces; each piece blocks while the channel is full, which is the
/// backpressure that throttles the source.
fn run_source(mut source: impl ByteSource, producer: ChannelProducer) {
    debug!("Starting source worker");
    let capacity = producer.capacity();

    while let Some(chunk) = source.next_chunk() {
        for piece in chunk.chunks(capacity) {
            producer.push(piece);
        }
    }

    debug!("byte source reached end of stream; closing channel");
    // Dropping the producer closes the channel and lets the decoder drain.
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::decoder::{DecodeResult, FrameInfo};
    use bridge_traits::error::Result as CapResult;
    use bridge_traits::source::MemorySource;

    struct NullDecoder;

    impl FrameDecoder for NullDecoder {
        fn decode_frame(&mut self, input: &[u8], _output: &mut [i16]) -> DecodeResult {
            DecodeResult {
                samples: 0,
                bytes_consumed: input.len().min(1),
                info: FrameInfo::new(0, 0, 0),
            }
        }
    }

    struct NullOutput;

    impl AudioOutput for NullOutput {
        fn write(&mut self, data: &[u8]) -> CapResult<usize> {
            Ok(data.len())
        }
    }

    #[test]
    fn test_invalid_config_is_fatal() {
        let mut config = PipelineConfig::default();
        config.max_decode_retries = 0;

        let result = Pipeline::spawn(
            MemorySource::once(vec![0u8; 16], 4),
            NullDecoder,
            NullOutput,
            config,
        );
        assert!(matches!(result, Err(PipelineError::Config(_))));
    }

    #[test]
    fn test_spawn_starts_workers() {
        let pipeline = Pipeline::spawn(
            MemorySource::once(vec![0u8; 16], 4),
            NullDecoder,
            NullOutput,
            PipelineConfig::small_buffers(),
        )
        .unwrap();

        // The finite source drains quickly and its worker exits.
        let deadline = std::time::Instant::now() + std::time::Duration::from_secs(5);
        while !pipeline.source_finished() && std::time::Instant::now() < deadline {
            std::thread::sleep(std::time::Duration::from_millis(10));
        }
        assert!(pipeline.source_finished());
    }
}
