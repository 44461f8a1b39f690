//! Audio output capability.
//!
//! Abstracts the hardware output channel. Channel setup, clocking and
//! teardown are the host's responsibility; the pipeline only pushes PCM
//! bytes through this trait.

use crate::error::Result;

/// Trait for output devices that accept PCM bytes.
///
/// Called from the pipeline's sink worker, which is the worker with the
/// tightest deadline.
///
/// ## Contract
///
/// - Partial writes are allowed: the return value is the number of bytes the
///   device actually accepted, and the caller retries with the remainder.
/// - The call may block while the device drains its own buffers.
/// - Implementations that bound their blocking with a deadline report
///   exceeding it as [`CapabilityError::OutputTimedOut`](crate::CapabilityError);
///   the sink drops the remainder of that frame and continues.
pub trait AudioOutput: Send {
    /// Write PCM bytes to the device, returning how many were accepted.
    fn write(&mut self, data: &[u8]) -> Result<usize>;
}
