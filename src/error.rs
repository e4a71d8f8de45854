use std::io;

/// Errors produced while building, editing, or (de)serializing PCM audio.
#[derive(Debug, thiserror::Error)]
pub enum PaudError {
    /// An integer index or slice bound fell outside the frame sequence.
    #[error("index {index} out of range for {len} frames")]
    IndexOutOfRange { index: usize, len: usize },
    /// A timestamp string or header field could not be parsed.
    #[error("parse error: {0}")]
    Parse(String),
    /// The container declares an unhandled compression type or a corrupt field.
    #[error("unsupported format: {0}")]
    UnsupportedFormat(String),
    /// A frame of the wrong shape was stored through an indexing operation.
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
    /// An arithmetic operand was not acceptable (e.g. a negative repeat count).
    #[error("invalid operand: {0}")]
    InvalidOperand(String),
    /// An argument was out of its legal domain (e.g. splitting into zero chunks).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    /// A value cannot be represented as a frame.
    #[error("invalid value: {0}")]
    InvalidValue(String),
    /// A buffer or audio was configured with inconsistent parameters.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
    /// A wrapped I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, PaudError>;
