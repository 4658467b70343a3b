//! Cached line store backed by a single text file.

use crate::error::{StorageError, StorageResult};
use crate::hash::StoreHash;
use crate::options::StoreOptions;
use crate::separator::{split_lines, LineSeparator};
use regex::Regex;
use std::ffi::OsString;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// How [`LineStore::write_line`] treats the line already at the target position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    /// Insert before the existing line, shifting it and its successors down.
    Insert,
    /// Overwrite the existing line. Writing at `len` appends.
    Replace,
}

/// A persistent, line-oriented record store.
///
/// The store owns one UTF-8 text file and keeps every line of it in an
/// ordered in-memory cache. Reads are served from the cache. Every mutation
/// updates the cache, rewrites the whole file from it and, if the rewrite
/// fails, reverts the cache to its pre-call value.
///
/// # Invariants
///
/// - After a mutating call returns `Ok`, the cache equals the file content
/// - After a mutating call returns `Err`, the cache equals its pre-call value
/// - The file is written with the terminator detected on open
///
/// # Concurrency
///
/// A store is meant to be the only writer of its file within a process.
/// Edits made by other processes are detected by [`LineStore::force_hash`],
/// never prevented.
///
/// # Example
///
/// ```no_run
/// use pocolib_storage::{LineStore, WriteMode};
/// use std::path::Path;
///
/// let mut store = LineStore::open(Path::new("users.db")).unwrap();
/// store.append_line("u-1").unwrap();
/// store.write_line(0, "u-0", WriteMode::Replace).unwrap();
/// assert_eq!(store.read_line(0), Some("u-0"));
/// ```
#[derive(Debug)]
pub struct LineStore {
    path: PathBuf,
    options: StoreOptions,
    separator: LineSeparator,
    cache: Vec<String>,
    hash: Option<StoreHash>,
}

impl LineStore {
    /// Opens the store at `path` with default options.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or its parent directories cannot be created.
    pub fn open(path: &Path) -> StorageResult<Self> {
        Self::open_with_options(path, StoreOptions::default())
    }

    /// Opens the store at `path`.
    ///
    /// Detects the line terminator, loads every line into the cache and
    /// computes the initial hash. A file that cannot be read leaves the
    /// cache empty and the hash unavailable; reads retry the load later.
    ///
    /// # Errors
    ///
    /// Returns an error if `create_if_missing` is set and the file or its
    /// parent directories cannot be created.
    pub fn open_with_options(path: &Path, options: StoreOptions) -> StorageResult<Self> {
        if options.create_if_missing && !path.exists() {
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    fs::create_dir_all(parent)?;
                }
            }
            OpenOptions::new()
                .write(true)
                .create(true)
                .truncate(false)
                .open(path)?;
        }

        let mut store = Self {
            path: path.to_path_buf(),
            separator: options.fallback_separator(),
            options,
            cache: Vec::new(),
            hash: None,
        };

        match store.rebuild_cache() {
            Ok(()) => {
                store.hash = Some(store.cache_hash());
            }
            Err(e) => {
                warn!(path = %store.path.display(), error = %e, "failed to load line store");
            }
        }

        Ok(store)
    }

    /// Returns the path to the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns the options the store was opened with.
    #[must_use]
    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    /// Returns the line terminator used for this file.
    #[must_use]
    pub fn separator(&self) -> LineSeparator {
        self.separator
    }

    /// Returns the number of cached lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cache.len()
    }

    /// Returns true if the cache holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Returns the cached lines in file order.
    #[must_use]
    pub fn lines(&self) -> &[String] {
        &self.cache
    }

    /// Returns the most recently computed hash without recomputing it.
    #[must_use]
    pub fn stored_hash(&self) -> Option<StoreHash> {
        self.hash
    }

    /// Reloads the cache from the file.
    ///
    /// On failure the cache keeps its previous content.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid UTF-8.
    pub fn rebuild_cache(&mut self) -> StorageResult<()> {
        let (lines, separator) = self.read_file()?;
        debug!(path = %self.path.display(), lines = lines.len(), %separator, "rebuilt line cache");
        self.cache = lines;
        self.separator = separator;
        Ok(())
    }

    /// Reads the line at `index`.
    ///
    /// Returns `None` if `index` is out of range or the file cannot be read.
    pub fn read_line(&mut self, index: usize) -> Option<&str> {
        if self.ensure_cache().is_err() {
            return None;
        }
        self.cache.get(index).map(String::as_str)
    }

    /// Writes `content` at `index`.
    ///
    /// With [`WriteMode::Insert`] the line is inserted (appended when
    /// `index == len`). With [`WriteMode::Replace`] the existing line is
    /// overwritten; `index == len` behaves as an insert.
    ///
    /// # Errors
    ///
    /// - [`StorageError::EmbeddedTerminator`] if `content` contains `\n` or `\r`
    /// - [`StorageError::OutOfRange`] if `index > len`
    /// - [`StorageError::Io`] if the file cannot be rewritten; the cache is
    ///   restored before returning
    pub fn write_line(&mut self, index: usize, content: &str, mode: WriteMode) -> StorageResult<()> {
        check_content(content)?;
        self.ensure_cache()?;

        let len = self.cache.len();
        if index > len {
            return Err(StorageError::OutOfRange { index, len });
        }

        let overwritten = if mode == WriteMode::Insert || index == len {
            self.cache.insert(index, content.to_string());
            None
        } else {
            Some(std::mem::replace(&mut self.cache[index], content.to_string()))
        };

        if let Err(e) = self.flush_cache() {
            match overwritten {
                None => {
                    self.cache.remove(index);
                }
                Some(previous) => self.cache[index] = previous,
            }
            warn!(path = %self.path.display(), index, error = %e, "write failed, cache rolled back");
            return Err(e);
        }

        Ok(())
    }

    /// Appends `content` as the last line.
    ///
    /// # Errors
    ///
    /// See [`LineStore::write_line`].
    pub fn append_line(&mut self, content: &str) -> StorageResult<()> {
        self.ensure_cache()?;
        self.write_line(self.cache.len(), content, WriteMode::Insert)
    }

    /// Removes the line at `index` and returns it.
    ///
    /// # Errors
    ///
    /// - [`StorageError::OutOfRange`] if `index >= len`
    /// - [`StorageError::Io`] if the file cannot be rewritten; the removed
    ///   line is put back in the cache before returning
    pub fn remove_line(&mut self, index: usize) -> StorageResult<String> {
        self.ensure_cache()?;

        let len = self.cache.len();
        if index >= len {
            return Err(StorageError::OutOfRange { index, len });
        }

        let removed = self.cache.remove(index);

        if let Err(e) = self.flush_cache() {
            self.cache.insert(index, removed);
            warn!(path = %self.path.display(), index, error = %e, "remove failed, cache rolled back");
            return Err(e);
        }

        Ok(removed)
    }

    /// Returns the index of the first line satisfying `predicate`.
    pub fn find_first_where<P>(&mut self, mut predicate: P) -> Option<usize>
    where
        P: FnMut(&str) -> bool,
    {
        if self.ensure_cache().is_err() {
            return None;
        }
        self.cache.iter().position(|line| predicate(line))
    }

    /// Returns the index of the first line in which `pattern` finds a match.
    pub fn find_first_match(&mut self, pattern: &Regex) -> Option<usize> {
        self.find_first_where(|line| pattern.is_match(line))
    }

    /// Returns the first line in which `pattern` finds a match.
    pub fn read_first_match(&mut self, pattern: &Regex) -> Option<&str> {
        let index = self.find_first_match(pattern)?;
        self.cache.get(index).map(String::as_str)
    }

    /// Replaces the first line matching `pattern` with `content`.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoMatch`] if no line matches, otherwise see
    /// [`LineStore::write_line`].
    pub fn substitute_first_match(&mut self, pattern: &Regex, content: &str) -> StorageResult<()> {
        let index = self.find_first_match(pattern).ok_or(StorageError::NoMatch)?;
        self.write_line(index, content, WriteMode::Replace)
    }

    /// Removes the first line matching `pattern` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`StorageError::NoMatch`] if no line matches, otherwise see
    /// [`LineStore::remove_line`].
    pub fn delete_first_match(&mut self, pattern: &Regex) -> StorageResult<String> {
        let index = self.find_first_match(pattern).ok_or(StorageError::NoMatch)?;
        self.remove_line(index)
    }

    /// Removes every line and truncates the file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be rewritten; the cache is
    /// restored before returning.
    pub fn clear(&mut self) -> StorageResult<()> {
        let previous = std::mem::take(&mut self.cache);

        if let Err(e) = self.flush_cache() {
            self.cache = previous;
            warn!(path = %self.path.display(), error = %e, "clear failed, cache rolled back");
            return Err(e);
        }

        Ok(())
    }

    /// Computes the hash over the cache and stores it.
    ///
    /// An empty cache is reloaded first. Returns `None` (and stores it) if
    /// the reload fails, e.g. because the file was deleted.
    pub fn hash(&mut self) -> Option<StoreHash> {
        if self.ensure_cache().is_err() {
            self.hash = None;
            return None;
        }
        let hash = self.cache_hash();
        self.hash = Some(hash);
        Some(hash)
    }

    /// Recomputes the hash from the file itself, bypassing the cache.
    ///
    /// If the result differs from the stored hash the cache is reloaded
    /// from the file, so it reconverges with external edits. The fresh
    /// value is always stored, including `None` when the file is unreadable.
    pub fn force_hash(&mut self) -> Option<StoreHash> {
        let fresh = match self.read_file() {
            Ok((lines, separator)) => {
                let hash = StoreHash::of_lines(&lines, separator);
                if Some(hash) != self.hash {
                    debug!(path = %self.path.display(), "store changed on disk, reloading cache");
                    self.cache = lines;
                    self.separator = separator;
                }
                Some(hash)
            }
            Err(e) => {
                warn!(path = %self.path.display(), error = %e, "failed to hash store file");
                if self.hash.is_some() {
                    self.cache.clear();
                }
                None
            }
        };

        self.hash = fresh;
        fresh
    }

    fn ensure_cache(&mut self) -> StorageResult<()> {
        if self.cache.is_empty() {
            self.rebuild_cache()?;
        }
        Ok(())
    }

    fn cache_hash(&self) -> StoreHash {
        StoreHash::of_lines(&self.cache, self.separator)
    }

    fn read_file(&self) -> StorageResult<(Vec<String>, LineSeparator)> {
        let bytes = fs::read(&self.path)?;
        let separator = LineSeparator::detect(&bytes).unwrap_or(self.separator);
        let text = String::from_utf8(bytes).map_err(|e| StorageError::InvalidUtf8(e.to_string()))?;
        Ok((split_lines(&text), separator))
    }

    /// Rewrites the whole file from the cache via a temp file and rename.
    fn flush_cache(&self) -> StorageResult<()> {
        let terminator = self.separator.as_str();
        let capacity = self
            .cache
            .iter()
            .map(|line| line.len() + terminator.len())
            .sum();
        let mut contents = String::with_capacity(capacity);
        for line in &self.cache {
            contents.push_str(line);
            contents.push_str(terminator);
        }

        let temp_path = self.temp_path();
        let result = self
            .write_temp(&temp_path, contents.as_bytes())
            .and_then(|()| fs::rename(&temp_path, &self.path).map_err(StorageError::from));

        if result.is_err() {
            let _ = fs::remove_file(&temp_path);
        }

        result
    }

    fn write_temp(&self, temp_path: &Path, data: &[u8]) -> StorageResult<()> {
        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(temp_path)?;
        file.write_all(data)?;
        if self.options.sync_on_write {
            file.sync_all()?;
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(OsString::from)
            .unwrap_or_else(|| OsString::from("store"));
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

fn check_content(content: &str) -> StorageResult<()> {
    if content.contains(['\n', '\r']) {
        return Err(StorageError::EmbeddedTerminator);
    }
    Ok(())
}
