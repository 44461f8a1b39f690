//! Frame decoder capability.
//!
//! The pipeline treats frame decoding as a black box: given the bytes staged
//! so far and an output buffer, the decoder either produces one PCM frame or
//! skips garbage while searching for a frame boundary. Entropy decoding,
//! bit-reading and sync-word details stay behind this trait.

/// Stream metadata reported alongside a successfully decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameInfo {
    /// Number of audio channels in the decoded frame.
    pub channels: u16,
    /// Sample rate in hertz.
    pub sample_rate: u32,
    /// Average bitrate in kbps, as reported by the frame header.
    pub bitrate_kbps: u32,
}

impl FrameInfo {
    /// Create a new frame info description.
    pub fn new(channels: u16, sample_rate: u32, bitrate_kbps: u32) -> Self {
        Self {
            channels,
            sample_rate,
            bitrate_kbps,
        }
    }
}

/// Outcome of a single decode attempt.
///
/// Either quantity may be zero independently: a decoder skipping garbage
/// while searching for a sync word reports `samples == 0` with a nonzero
/// `bytes_consumed`; a decoder that needs more input than it was given
/// reports both as zero.
#[derive(Debug, Clone, Copy)]
pub struct DecodeResult {
    /// Number of PCM samples written into the output buffer.
    pub samples: usize,
    /// Number of input bytes consumed by this attempt.
    pub bytes_consumed: usize,
    /// Format metadata of the frame that produced the samples.
    pub info: FrameInfo,
}

impl DecodeResult {
    /// A decode attempt that produced nothing and consumed nothing.
    pub fn empty() -> Self {
        Self {
            samples: 0,
            bytes_consumed: 0,
            info: FrameInfo::new(0, 0, 0),
        }
    }

    /// Whether this attempt produced a playable frame.
    pub fn is_frame(&self) -> bool {
        self.samples > 0
    }
}

/// Trait for decoders that turn compressed bytes into PCM frames.
///
/// Driven from the pipeline's decoder worker thread, one call per decode
/// attempt.
///
/// ## Contract
///
/// - `bytes_consumed` must never exceed `input.len()`.
/// - At most `output.len()` samples may be written; `samples` reports how
///   many of them are valid.
/// - The call must be repeatable: after consuming a garbage prefix it will
///   be invoked again with the compacted remainder.
pub trait FrameDecoder: Send {
    /// Attempt to decode one frame from the front of `input`.
    fn decode_frame(&mut self, input: &[u8], output: &mut [i16]) -> DecodeResult;
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockall::mock;

    mock! {
        Decoder {}

        impl FrameDecoder for Decoder {
            fn decode_frame(&mut self, input: &[u8], output: &mut [i16]) -> DecodeResult;
        }
    }

    #[test]
    fn decode_result_classification() {
        assert!(!DecodeResult::empty().is_frame());

        let frame = DecodeResult {
            samples: 1152,
            bytes_consumed: 417,
            info: FrameInfo::new(2, 44100, 128),
        };
        assert!(frame.is_frame());
    }

    #[test]
    fn mocked_decoder_reports_consumption() {
        let mut decoder = MockDecoder::new();
        decoder.expect_decode_frame().returning(|input, _output| DecodeResult {
            samples: 0,
            bytes_consumed: input.len().min(4),
            info: FrameInfo::new(0, 0, 0),
        });

        let mut out = [0i16; 8];
        let result = decoder.decode_frame(&[1, 2, 3, 4, 5, 6], &mut out);
        assert_eq!(result.bytes_consumed, 4);
        assert!(!result.is_frame());
    }
}
