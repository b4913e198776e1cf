//! Engine error types.

use thiserror::Error;

use crate::types::ParseFailure;

/// Errors that can abort an analysis run.
///
/// Per-line problems in lenient mode never surface here; they are
/// accumulated into [`crate::types::ParsingStats`] instead. A
/// [`EngineError::Parse`] is produced only in strict mode, for the first
/// failing line.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("log file not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(String),

    #[error("log file too large: {path} is {size_bytes} bytes (limit {max_bytes})")]
    FileTooLarge {
        path: String,
        size_bytes: u64,
        max_bytes: u64,
    },

    #[error("parse error on line {}: {}", .0.line_number, .0)]
    Parse(ParseFailure),

    #[error("invalid configuration: {0}")]
    Config(String),
}

/// Convenience alias for engine results.
pub type EngineResult<T> = Result<T, EngineError>;
