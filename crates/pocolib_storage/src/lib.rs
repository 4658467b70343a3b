//! # PocoLib Storage
//!
//! Line-oriented persistent store for PocoLib.
//!
//! A [`LineStore`] owns exactly one UTF-8 text file holding one record per
//! line. The whole file is mirrored in an ordered in-memory cache; every
//! mutation rewrites the file from the cache and rolls the cache back when
//! the write fails, so the two never diverge.
//!
//! ## Design Principles
//!
//! - Lines are opaque strings; the store never interprets record contents
//! - Positions are transient and shift on insert/remove
//! - The file uses the line terminator found in its existing content
//! - A [`StoreHash`] over lines + terminator detects external edits
//!
//! ## Example
//!
//! ```no_run
//! use pocolib_storage::{LineStore, WriteMode};
//! use std::path::Path;
//!
//! let mut store = LineStore::open(Path::new("books.db")).unwrap();
//! store.append_line("A").unwrap();
//! store.write_line(0, "B", WriteMode::Insert).unwrap();
//! assert_eq!(store.read_line(0), Some("B"));
//! assert_eq!(store.remove_line(0).unwrap(), "B");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod error;
mod hash;
mod line_store;
mod options;
mod separator;

pub use error::{StorageError, StorageResult};
pub use hash::{HashParseError, StoreHash};
pub use line_store::{LineStore, WriteMode};
pub use options::StoreOptions;
pub use separator::LineSeparator;
