//! Store-backed entity collections.
//!
//! Provides `EntitySet<T>`, which keeps decoded entities, their trigram
//! index and a line store consistent, plus the snapshot format used to
//! skip decoding at startup.

mod entity_set;
mod sequence;
mod snapshot;
mod state;

#[cfg(test)]
mod test_support;

pub use entity_set::EntitySet;
pub use sequence::IdSequence;
pub use state::{RebuildReport, SkippedLine, SnapshotStatus, SyncState};
