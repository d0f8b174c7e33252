//! Error types for the symposium crate.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading process-burst records.
///
/// Either variant aborts the burst phase before any task is started.
#[derive(Debug, Error)]
pub enum InputReadError {
    /// The input source could not be opened or read.
    #[error("cannot read {}: {source}", .path.display())]
    Io {
        /// Path of the input source.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// A line did not hold an `<id> <duration>` record.
    #[error("malformed record on line {line} ({content:?}): {reason}")]
    Malformed {
        /// 1-based line number.
        line: usize,
        /// Raw line content.
        content: String,
        /// What was wrong with it.
        reason: String,
    },
}

/// Top-level errors for the symposium phases.
#[derive(Debug, Error)]
pub enum SymposiumError {
    /// Configuration rejected before anything was started.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Burst input could not be read.
    #[error("input error: {0}")]
    Input(#[from] InputReadError),

    /// The async runtime could not be built.
    #[error("runtime error: {0}")]
    Runtime(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type SymposiumResult<T> = Result<T, SymposiumError>;
