//! # Streaming Playback Pipeline Core
//!
//! A three-stage realtime audio pipeline: a byte source feeds compressed
//! audio into a bounded channel, a decoder worker synchronizes against frame
//! boundaries and decodes PCM, and a sink worker reshapes each frame for the
//! output transport and writes it to the hardware capability.
//!
//! ## Architecture
//!
//! ```text
//! ByteSource ──► CompressedByteChannel ──► Synchronizer ──► FrameHandoff ──► SinkWorker ──► AudioOutput
//!                (bounded, blocking)        (seek/lock)      (one frame       (downmix +
//!                                                            in flight)       write loop)
//! ```
//!
//! The pipeline tolerates stream corruption (bounded decode retries, then a
//! flush-and-reseek), mid-stream desynchronization and transient source
//! stalls (backpressure and blocking pulls). Exactly one PCM frame buffer
//! exists; the handoff moves it between the decoder and the sink, so the
//! shared buffer is single-owner at every instant without a lock.
//!
//! The external capabilities (byte source, frame decoder, output device)
//! are consumed through the traits in the `bridge-traits` crate.

pub mod byte_channel;
pub mod config;
pub mod diag;
pub mod error;
pub mod frame;
pub mod handoff;
pub mod pipeline;
pub mod sink;
pub mod synchronizer;

pub use byte_channel::{bounded, ChannelConsumer, ChannelProducer, PullMode};
pub use config::PipelineConfig;
pub use diag::{DiagnosticsSnapshot, PipelineDiagnostics};
pub use error::{PipelineError, Result};
pub use frame::{PcmFrame, MAX_SAMPLES_PER_FRAME};
pub use handoff::{frame_handoff, FrameConsumer, FrameProducer};
pub use pipeline::Pipeline;
pub use sink::SinkWorker;
pub use synchronizer::{next_state, DecodeOutcome, SyncState, Synchronizer};
