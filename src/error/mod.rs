//! Error handling module for cnvt

use thiserror::Error;

/// Main error type for cnvt operations
#[derive(Error, Debug)]
pub enum CnvtError {
    /// Invalid or conflicting command line options
    #[error("configuration error: {message}")]
    Config { message: String },

    /// Requested stream index exceeds the number of streams of that type
    #[error("stream index {index} out of range: {path} has {available} {stream_type} stream(s)")]
    SelectorOutOfRange {
        stream_type: String,
        index: usize,
        available: usize,
        path: String,
    },

    /// Output destination is not usable
    #[error("output path error: {message}")]
    OutputPath { message: String },

    /// No input files matched the input specifier
    #[error("no input files matched: {input}")]
    NoInputs { input: String },

    /// ffprobe failed or returned unparseable output
    #[error("failed to probe {path}: {message}")]
    Probe { path: String, message: String },

    /// External tool exited with a non-zero status
    #[error("{program} exited with status {code}")]
    ExternalTool { program: String, code: i32 },

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CnvtError {
    /// Shorthand for building a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        CnvtError::Config {
            message: message.into(),
        }
    }
}

/// Result type alias for cnvt operations
pub type CnvtResult<T> = std::result::Result<T, CnvtError>;
