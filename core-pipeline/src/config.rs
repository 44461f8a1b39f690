//! # Pipeline Configuration
//!
//! Tunables for the streaming playback pipeline: buffer capacities, the
//! resynchronization fill threshold, retry bounds and worker stack sizes.

use serde::{Deserialize, Serialize};

/// Pipeline configuration.
///
/// Validated once at pipeline construction; an invalid configuration is
/// fatal at startup.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Capacity of the compressed byte channel between the source worker
    /// and the decoder worker, in bytes.
    ///
    /// The channel applies backpressure: a full channel blocks the source.
    ///
    /// Default: 8 KiB.
    #[serde(default = "default_channel_capacity")]
    pub channel_capacity: usize,

    /// Capacity of the decoder's private staging buffer, in bytes.
    ///
    /// Holds channel bytes not yet consumed by a successful decode.
    ///
    /// Default: 24 KiB.
    #[serde(default = "default_staging_capacity")]
    pub staging_capacity: usize,

    /// Staging occupancy the decoder insists on before attempting to decode
    /// while it is unsynchronized, in bytes.
    ///
    /// While seeking, small reads would make the decode-retry loop spin
    /// without progressing through the stream; forcing a larger fill bounds
    /// the number of retries needed to find a new frame boundary and parks
    /// the worker between fills instead of starving the source. Must not
    /// exceed `staging_capacity`.
    ///
    /// Default: 16 KiB (two thirds of the default staging capacity).
    #[serde(default = "default_sync_fill_threshold")]
    pub sync_fill_threshold: usize,

    /// Maximum decode attempts per cycle before declaring loss of sync.
    ///
    /// Default: 10.
    #[serde(default = "default_max_decode_retries")]
    pub max_decode_retries: u32,

    /// Emit a sink throughput report every this many sink cycles.
    ///
    /// Default: 100.
    #[serde(default = "default_throughput_report_interval")]
    pub throughput_report_interval: u64,

    /// Stack size of the source worker thread, in bytes.
    #[serde(default = "default_source_stack_bytes")]
    pub source_stack_bytes: usize,

    /// Stack size of the decoder worker thread, in bytes. Larger than the
    /// others: decoder implementations carry big state.
    #[serde(default = "default_decoder_stack_bytes")]
    pub decoder_stack_bytes: usize,

    /// Stack size of the sink worker thread, in bytes.
    #[serde(default = "default_sink_stack_bytes")]
    pub sink_stack_bytes: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            channel_capacity: default_channel_capacity(),
            staging_capacity: default_staging_capacity(),
            sync_fill_threshold: default_sync_fill_threshold(),
            max_decode_retries: default_max_decode_retries(),
            throughput_report_interval: default_throughput_report_interval(),
            source_stack_bytes: default_source_stack_bytes(),
            decoder_stack_bytes: default_decoder_stack_bytes(),
            sink_stack_bytes: default_sink_stack_bytes(),
        }
    }
}

impl PipelineConfig {
    /// Configuration sized for tests and short in-memory streams: small
    /// buffers, quick resynchronization.
    pub fn small_buffers() -> Self {
        Self {
            channel_capacity: 1024,
            staging_capacity: 3072,
            sync_fill_threshold: 2048,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.channel_capacity == 0 {
            return Err("channel_capacity must be > 0".to_string());
        }

        if self.staging_capacity == 0 {
            return Err("staging_capacity must be > 0".to_string());
        }

        if self.sync_fill_threshold == 0 || self.sync_fill_threshold > self.staging_capacity {
            return Err(
                "sync_fill_threshold must be in 1..=staging_capacity".to_string(),
            );
        }

        if self.max_decode_retries == 0 {
            return Err("max_decode_retries must be > 0".to_string());
        }

        if self.throughput_report_interval == 0 {
            return Err("throughput_report_interval must be > 0".to_string());
        }

        if self.source_stack_bytes == 0 || self.decoder_stack_bytes == 0 || self.sink_stack_bytes == 0
        {
            return Err("worker stack sizes must be > 0".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_channel_capacity() -> usize {
    8 * 1024
}

fn default_staging_capacity() -> usize {
    24 * 1024
}

fn default_sync_fill_threshold() -> usize {
    default_staging_capacity() * 2 / 3
}

fn default_max_decode_retries() -> u32 {
    10
}

fn default_throughput_report_interval() -> u64 {
    100
}

fn default_source_stack_bytes() -> usize {
    128 * 1024
}

fn default_decoder_stack_bytes() -> usize {
    512 * 1024
}

fn default_sink_stack_bytes() -> usize {
    128 * 1024
}
