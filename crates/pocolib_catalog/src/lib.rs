//! # PocoLib Catalog
//!
//! The library domain on top of [`pocolib_core`].
//!
//! This crate provides:
//! - [`Book`], [`User`] and [`Lending`], each stored one per line
//! - [`Library`], which opens the three entity sets in dependency order
//!   (lendings resolve the books and users they name) and keeps copy and
//!   borrow counters consistent across lend and return
//!
//! # Example
//!
//! ```no_run
//! use pocolib_catalog::{Book, Library, LibraryConfig};
//!
//! let mut library = Library::open(LibraryConfig::new("data")).unwrap();
//! let book = Book::new("Dune", vec!["Frank Herbert".into()], "9780441013593", 1965, 2).unwrap();
//! library.add_or_edit_book(book).unwrap();
//!
//! for book in library.books().search("herbert") {
//!     println!("{} ({})", book.title(), book.year());
//! }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod book;
mod config;
mod error;
mod fields;
mod lending;
mod library;
mod user;

pub use book::{Book, AUTHOR_SEPARATOR};
pub use config::{Collection, CollectionFiles, LibraryConfig};
pub use error::{CatalogError, CatalogResult};
pub use lending::{Lending, LendingContext};
pub use library::Library;
pub use user::User;
