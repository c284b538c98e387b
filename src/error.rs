//! Error types for the detection engine

use std::fmt;

/// Errors that can occur while detecting, loading or scoring labels
#[derive(Debug, Clone, PartialEq)]
pub enum DetectionError {
    /// Out-of-range or inconsistent configuration parameter
    InvalidConfig(String),

    /// Empty or all-zero signal, or a region of interest outside the signal
    DegenerateSignal(String),

    /// Label file violates the two-line tab-delimited layout
    MalformedLabelFile(String),

    /// File could not be opened, read or written
    IoFailure(String),

    /// Audio container or codec error
    DecodingError(String),
}

impl fmt::Display for DetectionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DetectionError::InvalidConfig(msg) => write!(f, "Invalid config: {}", msg),
            DetectionError::DegenerateSignal(msg) => write!(f, "Degenerate signal: {}", msg),
            DetectionError::MalformedLabelFile(msg) => write!(f, "Malformed label file: {}", msg),
            DetectionError::IoFailure(msg) => write!(f, "I/O failure: {}", msg),
            DetectionError::DecodingError(msg) => write!(f, "Decoding error: {}", msg),
        }
    }
}

impl std::error::Error for DetectionError {}

impl From<std::io::Error> for DetectionError {
    fn from(err: std::io::Error) -> Self {
        DetectionError::IoFailure(err.to_string())
    }
}
