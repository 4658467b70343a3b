//! Error types for line store operations.

use std::io;
use thiserror::Error;

/// Result type for line store operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Errors that can occur during line store operations.
///
/// None of these leave the cache and the file out of step: a mutating call
/// that returns one of them has already restored its cache.
#[derive(Debug, Error)]
pub enum StorageError {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line position was outside the current line range.
    #[error("line {index} out of range (store holds {len} lines)")]
    OutOfRange {
        /// The requested position.
        index: usize,
        /// The number of lines in the store.
        len: usize,
    },

    /// The content of a line contained a line terminator.
    #[error("line content contains an embedded line terminator")]
    EmbeddedTerminator,

    /// The store file is not valid UTF-8.
    #[error("store file is not valid UTF-8: {0}")]
    InvalidUtf8(String),

    /// No line matched the requested pattern.
    #[error("no line matches the pattern")]
    NoMatch,
}

impl StorageError {
    /// Returns `true` for failures that only signal absence (out of range, no match).
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::OutOfRange { .. } | Self::NoMatch)
    }
}
