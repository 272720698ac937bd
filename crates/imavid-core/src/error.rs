//! Error types for ImaVid.

use std::fmt;
use thiserror::Error;

/// The medium an operation works on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    Image,
    Video,
}

impl fmt::Display for MediaKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Image => f.write_str("image"),
            Self::Video => f.write_str("video"),
        }
    }
}

/// Main error type for ImaVid operations.
///
/// Every variant is recoverable; callers report it and carry on.
#[derive(Error, Debug)]
pub enum ImavidError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No {0} loaded")]
    NoMediaLoaded(MediaKind),

    #[error("Frame sequence is empty")]
    EmptySequence,

    #[error("Invalid frame: {0}")]
    InvalidFrame(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Decoder error: {0}")]
    Decode(String),

    #[error("Encoder error: {0}")]
    Encode(String),

    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

/// Result type alias for ImaVid operations.
pub type Result<T> = std::result::Result<T, ImavidError>;
