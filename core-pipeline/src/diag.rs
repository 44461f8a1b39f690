//! # Pipeline Diagnostics
//!
//! Shared observability surface plus the debug checksums the workers log.
//! Everything here is advisory: hosts and tests read it, correctness never
//! depends on it.

use crate::synchronizer::SyncState;
use bridge_traits::decoder::FrameInfo;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// 16-bit modular byte sum, used in diagnostic log fields to spot corrupted
/// hand-offs between stages. Not for correctness.
pub fn checksum(bytes: &[u8]) -> u16 {
    bytes
        .iter()
        .fold(0u16, |acc, &b| acc.wrapping_add(b as u16))
}

/// Checksum over PCM samples, summing their little-endian bytes.
pub fn pcm_checksum(samples: &[i16]) -> u16 {
    samples.iter().fold(0u16, |acc, &s| {
        let [lo, hi] = s.to_le_bytes();
        acc.wrapping_add(lo as u16).wrapping_add(hi as u16)
    })
}

/// Counters and state snapshots published by the running workers.
///
/// Updated with relaxed atomics off the hot path; the decoder's format info
/// sits behind a lock since it changes rarely (first lock, format change).
#[derive(Debug, Default)]
pub struct PipelineDiagnostics {
    locked: AtomicBool,
    bytes_consumed: AtomicU64,
    frames_decoded: AtomicU64,
    sync_losses: AtomicU64,
    bytes_written: AtomicU64,
    last_format: Mutex<Option<FrameInfo>>,
}

impl PipelineDiagnostics {
    pub(crate) fn set_state(&self, state: SyncState) {
        self.locked
            .store(state == SyncState::Locked, Ordering::Relaxed);
    }

    pub(crate) fn add_bytes_consumed(&self, bytes: u64) {
        // fetch_add wraps on overflow, matching the wrapping position counter.
        self.bytes_consumed.fetch_add(bytes, Ordering::Relaxed);
    }

    pub(crate) fn record_frame(&self, info: FrameInfo) {
        self.frames_decoded.fetch_add(1, Ordering::Relaxed);
        let mut last = self.last_format.lock();
        *last = Some(info);
    }

    pub(crate) fn record_sync_loss(&self) {
        self.sync_losses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add_bytes_written(&self, bytes: u64) {
        self.bytes_written.fetch_add(bytes, Ordering::Relaxed);
    }

    /// Current synchronizer state.
    pub fn sync_state(&self) -> SyncState {
        if self.locked.load(Ordering::Relaxed) {
            SyncState::Locked
        } else {
            SyncState::Seeking
        }
    }

    /// Point-in-time copy of all counters.
    pub fn snapshot(&self) -> DiagnosticsSnapshot {
        DiagnosticsSnapshot {
            sync_state: self.sync_state(),
            bytes_consumed: self.bytes_consumed.load(Ordering::Relaxed),
            frames_decoded: self.frames_decoded.load(Ordering::Relaxed),
            sync_losses: self.sync_losses.load(Ordering::Relaxed),
            bytes_written: self.bytes_written.load(Ordering::Relaxed),
            last_format: *self.last_format.lock(),
        }
    }
}

/// Point-in-time view of the pipeline counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticsSnapshot {
    /// Synchronizer state at snapshot time.
    pub sync_state: SyncState,
    /// Compressed bytes the decoder has consumed (wrapping).
    pub bytes_consumed: u64,
    /// Frames successfully decoded.
    pub frames_decoded: u64,
    /// Times the decoder lost sync and flushed.
    pub sync_losses: u64,
    /// PCM bytes the sink has written to the output device.
    pub bytes_written: u64,
    /// Format info of the most recent decoded frame.
    pub last_format: Option<FrameInfo>,
}
