//! Synchronization state and rebuild reporting.

use std::fmt;

/// How an [`crate::EntitySet`] obtained its current content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// No store attached yet.
    Uninitialized,
    /// Entities and index were taken from a snapshot matching the store.
    LoadedFromSnapshot,
    /// Entities and index were decoded from the store's lines.
    RebuiltFromStore,
}

impl fmt::Display for SyncState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::LoadedFromSnapshot => "loaded from snapshot",
            Self::RebuiltFromStore => "rebuilt from store",
        };
        f.write_str(name)
    }
}

/// A store line that could not be turned into an entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedLine {
    /// 1-based line number in the store file.
    pub line_no: usize,
    /// Why the line was skipped.
    pub message: String,
}

/// Outcome of rebuilding an entity set from its store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RebuildReport {
    /// Number of lines decoded into entities.
    pub decoded: usize,
    /// Lines that failed to decode, in file order.
    pub skipped: Vec<SkippedLine>,
}

impl RebuildReport {
    /// Returns true if no line was skipped.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.skipped.is_empty()
    }
}

/// State of a snapshot file relative to its store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SnapshotStatus {
    /// No snapshot file exists.
    Missing,
    /// The snapshot was taken from the current store content.
    Fresh,
    /// The snapshot was taken from different store content.
    Stale,
    /// The snapshot cannot be read.
    Invalid(String),
}

impl fmt::Display for SnapshotStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing => f.write_str("missing"),
            Self::Fresh => f.write_str("fresh"),
            Self::Stale => f.write_str("stale"),
            Self::Invalid(reason) => write!(f, "invalid ({reason})"),
        }
    }
}
