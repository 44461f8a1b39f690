use thiserror::Error;

#[derive(Error, Debug)]
pub enum CapabilityError {
    #[error("Audio output write failed: {0}")]
    OutputFailed(String),

    #[error("Audio output made no progress within its deadline")]
    OutputTimedOut,

    #[error("Byte source failed: {0}")]
    SourceFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CapabilityError>;
