//! # PocoLib Core
//!
//! Store-backed entity collections for PocoLib.
//!
//! This crate provides:
//! - [`LineCodec`]: the contract an entity type implements to live in a line store
//! - [`NGramIndex`]: a trigram inverted index over searchable projections
//! - [`search`]: hit-count ranking with an edit-distance tie-breaker
//! - [`EntitySet`]: an entity collection kept in lockstep with its
//!   [`pocolib_storage::LineStore`], with hash-gated snapshot loading
//!
//! The text file behind each set is the single source of truth. Snapshots
//! only accelerate startup and are rebuilt from the store whenever they are
//! missing, unreadable or stale.

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod codec;
mod collection;
mod config;
mod error;
mod index;
pub mod search;

pub use codec::{join_fields, pad_field, split_fields, LineCodec, FIELD_SEPARATOR};
pub use collection::{
    EntitySet, IdSequence, RebuildReport, SkippedLine, SnapshotStatus, SyncState,
};
pub use config::Config;
pub use error::{CoreError, CoreResult};
pub use index::{shingles, NGramIndex, NGRAM_SIZE, PADDING_CHAR};
pub use search::{distance, order_by_distance, SearchResult};

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// Re-export the storage types that appear in this crate's API.
pub use pocolib_storage::{LineStore, StorageError, StoreHash, StoreOptions};
