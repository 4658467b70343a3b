//! Error types for the library catalog.

use pocolib_core::CoreError;
use thiserror::Error;

/// Result type for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors that can occur in catalog operations.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// Entity set or store error.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A field holds a character that would break the line format.
    #[error("invalid {field}: {reason}")]
    InvalidField {
        /// Name of the field.
        field: &'static str,
        /// What is wrong with it.
        reason: String,
    },

    /// Every copy of the book is lent out.
    #[error("all copies of {isbn} are already lent out")]
    NoCopiesAvailable {
        /// ISBN of the book.
        isbn: String,
    },

    /// No copy of the book is lent out.
    #[error("no copies of {isbn} are currently lent out")]
    NoCopiesLent {
        /// ISBN of the book.
        isbn: String,
    },

    /// The user has no borrowed book to give back.
    #[error("user {user_id} has no borrowed books")]
    NothingBorrowed {
        /// Id of the user.
        user_id: String,
    },

    /// A counter read from the store is at its maximum.
    #[error("{counter} of {key} cannot grow past {max}", max = u32::MAX)]
    CounterOverflow {
        /// Name of the counter.
        counter: &'static str,
        /// Key of the book or user holding it.
        key: String,
    },

    /// The lending was already closed.
    #[error("lending {id} was already returned")]
    AlreadyReturned {
        /// Id of the lending.
        id: u64,
    },

    /// The entity is still named by a lending.
    #[error("{kind} {key} is referenced by lending {lending_id}")]
    Referenced {
        /// Entity kind.
        kind: &'static str,
        /// Entity key.
        key: String,
        /// Id of a lending naming it.
        lending_id: u64,
    },
}

impl CatalogError {
    /// Creates an invalid field error.
    pub fn invalid_field(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidField {
            field,
            reason: reason.into(),
        }
    }

    /// Returns true if the error reports a missing entity.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Core(CoreError::NotFound { .. }))
    }
}
