//! # Pipeline Error Types
//!
//! Errors surfaced by pipeline construction. Running workers never propagate
//! errors across worker boundaries: every condition inside a worker loop is
//! downgraded to a recoverable outcome (sync loss, dropped frame) and logged.

use thiserror::Error;

/// Errors that can occur while building and starting the pipeline.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Configuration failed validation.
    #[error("Invalid pipeline configuration: {0}")]
    Config(String),

    /// A worker thread could not be created. Fatal: a half-initialized
    /// pipeline cannot safely hand off buffers.
    #[error("Could not create {worker} worker")]
    WorkerSpawn {
        worker: &'static str,
        #[source]
        source: std::io::Error,
    },
}

/// Result type for pipeline operations.
pub type Result<T> = std::result::Result<T, PipelineError>;
