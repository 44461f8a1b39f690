//! # Pipeline Bridge Traits
//!
//! Capability traits that must be implemented by collaborators of the
//! streaming playback pipeline.
//!
//! ## Overview
//!
//! This crate defines the contract between the pipeline core and the three
//! external capabilities it orchestrates but does not implement:
//!
//! - [`ByteSource`](source::ByteSource) - produces chunks of the compressed
//!   byte stream (radio fetch, file reader, in-memory data)
//! - [`FrameDecoder`](decoder::FrameDecoder) - decodes one compressed frame
//!   into PCM samples, reporting how many input bytes it consumed
//! - [`AudioOutput`](output::AudioOutput) - accepts PCM bytes for the
//!   hardware output channel, with partial writes allowed
//!
//! The pipeline places no transport or codec requirements on implementations;
//! it only relies on the contracts documented per trait. A trivial
//! [`MemorySource`](source::MemorySource) is provided for demos and tests
//! since it carries no transport protocol of its own.
//!
//! ## Error Handling
//!
//! Fallible capability operations use [`CapabilityError`](error::CapabilityError).
//! Implementations should convert their platform-specific failures into it
//! and include actionable context. Source-side transport failures are
//! expected to be handled internally (reconnect/retry); the pipeline never
//! sees them.
//!
//! ## Thread Safety
//!
//! Each capability is driven from exactly one pipeline worker thread, so the
//! traits require `Send` but not `Sync`.

pub mod decoder;
pub mod error;
pub mod output;
pub mod source;

pub use error::CapabilityError;

// Re-export commonly used types
pub use decoder::{DecodeResult, FrameDecoder, FrameInfo};
pub use output::AudioOutput;
pub use source::{ByteSource, MemorySource};
