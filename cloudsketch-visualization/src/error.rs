//! Error types for the interactive layer

use thiserror::Error;

/// Errors raised while configuring or driving a session
#[derive(Error, Debug)]
pub enum VisualizationError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Failed to parse configuration: {0}")]
    ConfigParse(String),

    #[error("Failed to serialize configuration: {0}")]
    ConfigSerialize(String),

    #[error(transparent)]
    Core(#[from] cloudsketch_core::Error),

    #[error(transparent)]
    Cloud(#[from] cloudsketch_io::IoError),
}

/// Result type alias for visualization operations
pub type Result<T> = std::result::Result<T, VisualizationError>;
