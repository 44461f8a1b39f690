//! # PCM Frame Buffer
//!
//! The single PCM buffer that travels between the decoder worker and the
//! sink worker. Exactly one [`PcmFrame`] exists per pipeline; the frame
//! handoff moves it back and forth, so each worker owns it exclusively while
//! it holds it. No lock guards the samples.

use bridge_traits::decoder::FrameInfo;

/// Worst-case number of PCM samples produced by one decoded MPEG audio
/// frame: 1152 samples per channel, two channels.
pub const MAX_SAMPLES_PER_FRAME: usize = 1152 * 2;

/// Fixed-capacity PCM sample buffer with a valid-sample count.
///
/// The decoder writes samples in place and sets the valid length; a length
/// of zero marks a sync-loss cycle that the sink must skip. The format info
/// of the producing decode rides along for the sink's transform and for
/// diagnostics.
#[derive(Debug)]
pub struct PcmFrame {
    samples: Box<[i16]>,
    len: usize,
    info: Option<FrameInfo>,
}

impl PcmFrame {
    /// Frame sized for the MPEG worst case.
    pub fn new() -> Self {
        Self::with_capacity(MAX_SAMPLES_PER_FRAME)
    }

    /// Frame with an explicit sample capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "frame capacity must be nonzero");
        Self {
            samples: vec![0i16; capacity].into_boxed_slice(),
            len: 0,
            info: None,
        }
    }

    /// Total sample capacity.
    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    /// Number of valid samples.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Whether the frame carries no valid samples (sync-loss cycle).
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Set the valid-sample count. Clamped to capacity.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.samples.len());
    }

    /// Format info of the decode that produced the samples, if any.
    pub fn info(&self) -> Option<FrameInfo> {
        self.info
    }

    /// Record the format info of a successful decode.
    pub fn set_info(&mut self, info: FrameInfo) {
        self.info = Some(info);
    }

    /// Mark the frame empty, dropping format info.
    pub fn clear(&mut self) {
        self.len = 0;
        self.info = None;
    }

    /// The valid samples.
    pub fn samples(&self) -> &[i16] {
        &self.samples[..self.len]
    }

    /// The whole backing buffer, for the decoder to write into.
    pub fn samples_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }
}

impl Default for PcmFrame {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_starts_empty() {
        let frame = PcmFrame::new();
        assert_eq!(frame.capacity(), MAX_SAMPLES_PER_FRAME);
        assert_eq!(frame.len(), 0);
        assert!(frame.is_empty());
        assert!(frame.info().is_none());
        assert!(frame.samples().is_empty());
    }

    #[test]
    fn test_set_len_exposes_valid_prefix() {
        let mut frame = PcmFrame::with_capacity(8);
        frame.samples_mut()[..4].copy_from_slice(&[1, 2, 3, 4]);
        frame.set_len(4);

        assert_eq!(frame.samples(), &[1, 2, 3, 4]);
        assert!(!frame.is_empty());
    }

    #[test]
    fn test_set_len_clamps_to_capacity() {
        let mut frame = PcmFrame::with_capacity(4);
        frame.set_len(100);
        assert_eq!(frame.len(), 4);
    }

    #[test]
    fn test_clear_drops_info() {
        let mut frame = PcmFrame::with_capacity(4);
        frame.set_len(2);
        frame.set_info(FrameInfo::new(2, 44100, 128));

        frame.clear();
        assert!(frame.is_empty());
        assert!(frame.info().is_none());
    }
}
