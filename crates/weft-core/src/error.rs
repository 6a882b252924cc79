//! Error types for weft-core.

use std::io;

/// Error type for weft-core operations.
#[derive(Debug, thiserror::Error)]
pub enum WeftError {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Terminal operation failed.
    #[error("terminal error: {0}")]
    Terminal(String),

    /// Layout construction or resolution failed.
    #[error("layout error: {0}")]
    Layout(String),

    /// A pipeline channel was closed or rejected a message.
    #[error("channel error: {0}")]
    Channel(String),

    /// Application construction failed.
    #[error("build error: {0}")]
    Build(String),
}

/// Result type alias for weft-core operations.
pub type Result<T> = std::result::Result<T, WeftError>;
