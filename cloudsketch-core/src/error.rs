//! Error types for cloudsketch

use thiserror::Error;

/// Main error type for cloudsketch core operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Invalid transform: {0}")]
    InvalidTransform(String),

    #[error("Recording is off")]
    NotRecording,

    #[error("Malformed snapshot entry: {0}")]
    MalformedSnapshot(String),
}

impl Error {
    /// Whether this condition is expected during normal interaction and
    /// should not be surfaced to the user
    pub fn is_benign(&self) -> bool {
        matches!(self, Error::NotRecording)
    }
}

/// Result type alias for cloudsketch operations
pub type Result<T> = std::result::Result<T, Error>;
