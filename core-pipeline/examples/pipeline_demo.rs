//! # Pipeline Usage Example
//!
//! Runs the full three-worker pipeline against synthetic collaborators: a
//! looping in-memory byte source, a frame decoder that turns each "frame"
//! into a burst of sine-wave PCM, and an output that plays the role of a
//! paced hardware device. Diagnostics are printed once per second.
//!
//! Run with: `cargo run --example pipeline_demo --package core-pipeline`

use bridge_traits::decoder::{DecodeResult, FrameDecoder, FrameInfo};
use bridge_traits::error::Result as CapabilityResult;
use bridge_traits::output::AudioOutput;
use bridge_traits::source::MemorySource;
use core_pipeline::{Pipeline, PipelineConfig};
use core_runtime::logging::{init_logging, LogLevel, LoggingConfig};
use std::thread;
use std::time::Duration;

// ============================================================================
// Synthetic frame stream (for demonstration)
// ============================================================================

const MAGIC: [u8; 2] = [0xF5, 0x9A];
const PAYLOAD_LEN: usize = 64;
const SAMPLES_PER_FRAME: usize = 1152 * 2;
const SAMPLE_RATE: u32 = 48000;

fn build_stream(frames: usize) -> Vec<u8> {
    let mut out = Vec::new();
    for n in 0..frames {
        out.extend_from_slice(&MAGIC);
        out.push(PAYLOAD_LEN as u8);
        out.extend(std::iter::repeat((n % 251) as u8).take(PAYLOAD_LEN));
    }
    out
}

/// Decoder that synthesizes a 440 Hz tone for every well-formed frame.
struct ToneDecoder {
    phase: f64,
}

impl FrameDecoder for ToneDecoder {
    fn decode_frame(&mut self, input: &[u8], output: &mut [i16]) -> DecodeResult {
        let skip = DecodeResult {
            samples: 0,
            bytes_consumed: input.len().min(1),
            info: FrameInfo::new(0, 0, 0),
        };
        if input.len() < 3 || input[..2] != MAGIC {
            return skip;
        }
        let payload_len = input[2] as usize;
        if input.len() < 3 + payload_len {
            return DecodeResult {
                samples: 0,
                bytes_consumed: 0,
                info: FrameInfo::new(0, 0, 0),
            };
        }

        let step = 440.0 * 2.0 * std::f64::consts::PI / SAMPLE_RATE as f64;
        for pair in output.chunks_exact_mut(2).take(SAMPLES_PER_FRAME / 2) {
            let sample = (self.phase.sin() * 0.3 * i16::MAX as f64) as i16;
            pair[0] = sample;
            pair[1] = sample;
            self.phase += step;
        }

        DecodeResult {
            samples: SAMPLES_PER_FRAME,
            bytes_consumed: 3 + payload_len,
            info: FrameInfo::new(2, SAMPLE_RATE, 128),
        }
    }
}

/// Stand-in for the hardware output: accepts bytes at roughly the rate a
/// 48 kHz mono device would drain them.
struct PacedDeviceOutput;

impl AudioOutput for PacedDeviceOutput {
    fn write(&mut self, data: &[u8]) -> CapabilityResult<usize> {
        let samples = data.len() / 2;
        thread::sleep(Duration::from_micros(
            (samples as u64 * 1_000_000) / SAMPLE_RATE as u64,
        ));
        Ok(data.len())
    }
}

fn main() {
    init_logging(
        LoggingConfig::default()
            .with_level(LogLevel::Debug)
            .with_thread_info(true),
    )
    .expect("Failed to initialize logging");

    let source = MemorySource::looping(build_stream(256), 1024);
    let pipeline = Pipeline::spawn(
        source,
        ToneDecoder { phase: 0.0 },
        PacedDeviceOutput,
        PipelineConfig::default(),
    )
    .expect("Failed to start pipeline");

    let diagnostics = pipeline.diagnostics();
    for _ in 0..10 {
        thread::sleep(Duration::from_secs(1));
        let snapshot = diagnostics.snapshot();
        println!(
            "state={:?} frames={} consumed={}B written={}B losses={}",
            snapshot.sync_state,
            snapshot.frames_decoded,
            snapshot.bytes_consumed,
            snapshot.bytes_written,
            snapshot.sync_losses,
        );
    }
}
