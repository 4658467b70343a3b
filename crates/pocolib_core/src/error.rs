//! Error types for PocoLib core.

use std::io;
use thiserror::Error;

/// Result type for core operations.
pub type CoreResult<T> = Result<T, CoreError>;

/// Errors that can occur in core operations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Line store error.
    #[error("storage error: {0}")]
    Storage(#[from] pocolib_storage::StorageError),

    /// I/O error outside the line store (snapshot files).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// A line could not be decoded into an entity.
    #[error("malformed {kind} line: {message}")]
    MalformedLine {
        /// Entity kind of the codec that rejected the line.
        kind: &'static str,
        /// Description of what is wrong with the line.
        message: String,
    },

    /// A line names an entity that does not exist in the referenced set.
    #[error("unresolved {kind} reference: {key}")]
    UnresolvedReference {
        /// Entity kind of the missing reference.
        kind: &'static str,
        /// The key that could not be resolved.
        key: String,
    },

    /// Snapshot file is missing, corrupted or incompatible.
    #[error("invalid snapshot: {message}")]
    InvalidSnapshot {
        /// Description of the problem.
        message: String,
    },

    /// Entity not found.
    #[error("{kind} not found: {key}")]
    NotFound {
        /// Entity kind.
        kind: &'static str,
        /// Key that was looked up.
        key: String,
    },

    /// An entity held in memory has no matching line in its store.
    #[error("{kind} {key} has no line in the store")]
    LineMissing {
        /// Entity kind.
        kind: &'static str,
        /// Key of the entity.
        key: String,
    },

    /// Operation not permitted in current state.
    #[error("invalid operation: {message}")]
    InvalidOperation {
        /// Description of why operation is invalid.
        message: String,
    },
}

impl CoreError {
    /// Creates a malformed line error.
    pub fn malformed(kind: &'static str, message: impl Into<String>) -> Self {
        Self::MalformedLine {
            kind,
            message: message.into(),
        }
    }

    /// Creates an unresolved reference error.
    pub fn unresolved(kind: &'static str, key: impl Into<String>) -> Self {
        Self::UnresolvedReference {
            kind,
            key: key.into(),
        }
    }

    /// Creates an invalid snapshot error.
    pub fn invalid_snapshot(message: impl Into<String>) -> Self {
        Self::InvalidSnapshot {
            message: message.into(),
        }
    }

    /// Creates a not found error.
    pub fn not_found(kind: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            key: key.into(),
        }
    }

    /// Creates a missing line error.
    pub fn line_missing(kind: &'static str, key: impl Into<String>) -> Self {
        Self::LineMissing {
            kind,
            key: key.into(),
        }
    }

    /// Creates an invalid operation error.
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Returns true if the error concerns a single line rather than the store.
    #[must_use]
    pub fn is_line_error(&self) -> bool {
        matches!(
            self,
            Self::MalformedLine { .. } | Self::UnresolvedReference { .. }
        )
    }
}
