//! Library configuration.

use pocolib_core::Config;
use std::fmt;
use std::path::{Path, PathBuf};

/// One of the three collections of a library.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    /// Books, keyed by ISBN.
    Books,
    /// Users, keyed by id.
    Users,
    /// Lendings, keyed by numeric id.
    Lendings,
}

impl Collection {
    /// Every collection in load order.
    pub const ALL: [Self; 3] = [Self::Books, Self::Users, Self::Lendings];

    /// Returns the collection name, also the stem of its default file names.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Books => "books",
            Self::Users => "users",
            Self::Lendings => "lendings",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Store and snapshot file names of one collection, relative to the data
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionFiles {
    /// Line store file.
    pub store: PathBuf,
    /// Snapshot file.
    pub snapshot: PathBuf,
}

impl CollectionFiles {
    /// Creates file names for a collection.
    pub fn new(store: impl Into<PathBuf>, snapshot: impl Into<PathBuf>) -> Self {
        Self {
            store: store.into(),
            snapshot: snapshot.into(),
        }
    }

    fn default_for(collection: Collection) -> Self {
        Self::new(
            format!("{}.db", collection.name()),
            format!("{}.snapshot", collection.name()),
        )
    }
}

/// Configuration for a [`crate::Library`].
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Directory holding the store and snapshot files.
    pub data_dir: PathBuf,
    /// Book files.
    pub books: CollectionFiles,
    /// User files.
    pub users: CollectionFiles,
    /// Lending files.
    pub lendings: CollectionFiles,
    /// Entity set configuration shared by the three collections.
    pub core: Config,
}

impl LibraryConfig {
    /// Creates a configuration with default file names under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            books: CollectionFiles::default_for(Collection::Books),
            users: CollectionFiles::default_for(Collection::Users),
            lendings: CollectionFiles::default_for(Collection::Lendings),
            core: Config::default(),
        }
    }

    /// Sets the file names of a collection.
    #[must_use]
    pub fn with_files(mut self, collection: Collection, files: CollectionFiles) -> Self {
        match collection {
            Collection::Books => self.books = files,
            Collection::Users => self.users = files,
            Collection::Lendings => self.lendings = files,
        }
        self
    }

    /// Sets the entity set configuration.
    #[must_use]
    pub fn with_core(mut self, core: Config) -> Self {
        self.core = core;
        self
    }

    /// Returns the file names of a collection.
    #[must_use]
    pub fn files(&self, collection: Collection) -> &CollectionFiles {
        match collection {
            Collection::Books => &self.books,
            Collection::Users => &self.users,
            Collection::Lendings => &self.lendings,
        }
    }

    /// Returns the full path of a collection's store.
    #[must_use]
    pub fn store_path(&self, collection: Collection) -> PathBuf {
        self.resolve(&self.files(collection).store)
    }

    /// Returns the full path of a collection's snapshot.
    #[must_use]
    pub fn snapshot_path(&self, collection: Collection) -> PathBuf {
        self.resolve(&self.files(collection).snapshot)
    }

    fn resolve(&self, file: &Path) -> PathBuf {
        self.data_dir.join(file)
    }
}
