//! Store-backed entity set.

use crate::codec::LineCodec;
use crate::collection::snapshot;
use crate::collection::state::{RebuildReport, SkippedLine, SnapshotStatus, SyncState};
use crate::config::Config;
use crate::error::{CoreError, CoreResult};
use crate::index::NGramIndex;
use crate::search;
use pocolib_storage::{LineStore, StoreHash, WriteMode};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// A set of entities kept in lockstep with a [`LineStore`].
///
/// `EntitySet<T>` owns one line store, the decoded entities keyed by
/// [`LineCodec::key`], the store line each entity was read from or last
/// written as, and a trigram index over their searchable projections. The
/// store file is the source of truth:
///
/// - every mutation locates the entity's line by the text recorded for its
///   key, writes the store, and touches memory only if the write succeeded
/// - a snapshot is trusted only if its recorded hash equals the hash of
///   the live store file
/// - anything else falls back to decoding the store line by line
///
/// # Example
///
/// ```rust,ignore
/// let mut books: EntitySet<Book> = EntitySet::new(Config::default());
/// books.load_from_snapshot(&dir.join("books.snapshot"), &dir.join("books.db"), &())?;
///
/// books.add_or_edit(book)?;
/// for book in books.search("rust") {
///     println!("{}", book.title);
/// }
/// ```
#[derive(Debug)]
pub struct EntitySet<T: LineCodec> {
    config: Config,
    store: Option<LineStore>,
    entities: BTreeMap<T::Key, T>,
    lines: BTreeMap<T::Key, String>,
    index: NGramIndex<T::Key>,
    last_hash: Option<StoreHash>,
    snapshot_path: Option<PathBuf>,
    state: SyncState,
    last_rebuild: Option<RebuildReport>,
}

impl<T: LineCodec> EntitySet<T> {
    /// Creates an empty, uninitialized set.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            store: None,
            entities: BTreeMap::new(),
            lines: BTreeMap::new(),
            index: NGramIndex::new(),
            last_hash: None,
            snapshot_path: None,
            state: SyncState::Uninitialized,
            last_rebuild: None,
        }
    }

    /// Loads the set from a snapshot, falling back to the store.
    ///
    /// The snapshot is used only if it can be read and its recorded hash
    /// equals the hash of the file at `store_path`. Otherwise the set is
    /// rebuilt from the store. In both cases a store is attached at
    /// `store_path` and `snapshot_path` becomes the target of later saves.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or read. Snapshot
    /// problems are never errors.
    pub fn load_from_snapshot(
        &mut self,
        snapshot_path: &Path,
        store_path: &Path,
        ctx: &T::Context<'_>,
    ) -> CoreResult<SyncState> {
        self.snapshot_path = Some(snapshot_path.to_path_buf());

        let mut store = LineStore::open_with_options(store_path, self.config.store.clone())?;
        let current = store.force_hash();

        let trusted = match snapshot::read::<T>(snapshot_path) {
            Ok(snapshot) if current == Some(snapshot.store_hash) => Some(snapshot),
            Ok(snapshot) => {
                warn!(
                    kind = T::KIND,
                    recorded = %snapshot.store_hash,
                    "snapshot is stale, rebuilding from store"
                );
                None
            }
            Err(e) if snapshot_path.exists() => {
                warn!(kind = T::KIND, error = %e, "snapshot unusable, rebuilding from store");
                None
            }
            Err(_) => {
                debug!(kind = T::KIND, path = %snapshot_path.display(), "no snapshot");
                None
            }
        };

        self.store = Some(store);

        match trusted {
            Some(snapshot) => {
                self.entities.clear();
                self.lines.clear();
                for (line, entity) in snapshot.entries {
                    let key = entity.key();
                    self.lines.insert(key.clone(), line);
                    self.entities.insert(key, entity);
                }
                self.index = snapshot.index;
                self.last_hash = current;
                self.last_rebuild = None;
                self.state = SyncState::LoadedFromSnapshot;
                debug!(kind = T::KIND, entities = self.entities.len(), "loaded from snapshot");
            }
            None => {
                self.reindex(ctx)?;
            }
        }

        Ok(self.state)
    }

    /// Attaches the store at `store_path` and rebuilds the set from it.
    ///
    /// Every line is decoded with `ctx`. Lines that fail to decode, and
    /// lines repeating a key already decoded, are skipped and listed in
    /// the returned report. Blank lines are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be opened or read.
    pub fn rebuild_from_store(
        &mut self,
        store_path: &Path,
        ctx: &T::Context<'_>,
    ) -> CoreResult<RebuildReport> {
        let store = LineStore::open_with_options(store_path, self.config.store.clone())?;
        self.store = Some(store);
        self.reindex(ctx)
    }

    /// Rebuilds from the attached store if its file changed since the last
    /// synchronization.
    ///
    /// Returns true if a rebuild happened.
    ///
    /// # Errors
    ///
    /// Returns an error if no store is attached or the store cannot be read.
    pub fn refresh(&mut self, ctx: &T::Context<'_>) -> CoreResult<bool> {
        let store = self.store.as_mut().ok_or_else(not_attached)?;
        let current = store.force_hash();

        if current.is_some() && current == self.last_hash {
            return Ok(false);
        }

        info!(kind = T::KIND, "store changed on disk");
        self.reindex(ctx)?;
        Ok(true)
    }

    /// Inserts `entity`, or replaces the entity with the same key.
    ///
    /// A replaced entity's line is found by the text it was stored as, so
    /// lines that decode but would encode differently are still replaced
    /// in place. The store is left alone if the line would not change.
    /// Memory and index change only if the store write succeeds. Returns
    /// the replaced entity, if any.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::LineMissing`] if the replaced entity's line is
    /// no longer in the store, or an error if no store is attached or the
    /// store write fails.
    pub fn add_or_edit(&mut self, entity: T) -> CoreResult<Option<T>> {
        let store = self.store.as_mut().ok_or_else(not_attached)?;
        let key = entity.key();
        let line = entity.encode();

        match self.lines.get(&key) {
            Some(stored) => {
                let position = position_of::<T>(store, stored, &key)?;
                if *stored != line {
                    store.write_line(position, &line, WriteMode::Replace)?;
                }
            }
            None => store.append_line(&line)?,
        }

        if let Some(old) = self.entities.get(&key) {
            self.index.fast_remove(&old.searchable_projection(), &key);
        }
        self.index.add(&entity.searchable_projection(), key.clone());
        self.lines.insert(key.clone(), line);
        let previous = self.entities.insert(key, entity);
        self.last_hash = store.hash();

        self.autosave();
        Ok(previous)
    }

    /// Removes the entity with `key` and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::NotFound`] if no entity has `key`,
    /// [`CoreError::LineMissing`] if its line is no longer in the store, or
    /// an error if no store is attached or the store write fails. The set
    /// is unchanged on error.
    pub fn remove(&mut self, key: &T::Key) -> CoreResult<T> {
        let store = self.store.as_mut().ok_or_else(not_attached)?;
        let stored = self
            .lines
            .get(key)
            .ok_or_else(|| CoreError::not_found(T::KIND, key.to_string()))?;

        let position = position_of::<T>(store, stored, key)?;
        store.remove_line(position)?;

        self.lines.remove(key);
        let removed = self
            .entities
            .remove(key)
            .ok_or_else(|| CoreError::not_found(T::KIND, key.to_string()))?;
        self.index.fast_remove(&removed.searchable_projection(), key);
        self.last_hash = store.hash();

        self.autosave();
        Ok(removed)
    }

    /// Returns the entities matching `query`, best first.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&T> {
        self.search_with_hits(query)
            .into_iter()
            .map(|(entity, _)| entity)
            .collect()
    }

    /// Returns the entities matching `query` with their hit counts, best first.
    #[must_use]
    pub fn search_with_hits(&self, query: &str) -> Vec<(&T, usize)> {
        search::search(query, &self.index, |key| {
            self.entities
                .get(key)
                .map(|entity| entity.searchable_projection())
                .unwrap_or_default()
        })
        .into_iter()
        .filter_map(|result| self.entities.get(&result.item).map(|e| (e, result.hits)))
        .collect()
    }

    /// Writes the snapshot to the path given at load time.
    ///
    /// # Errors
    ///
    /// Returns an error if no snapshot path is set, the set has never been
    /// synchronized, or the file cannot be written.
    pub fn save_snapshot(&self) -> CoreResult<()> {
        let path = self
            .snapshot_path
            .as_deref()
            .ok_or_else(|| CoreError::invalid_operation("no snapshot path set"))?;
        self.save_snapshot_to(path)
    }

    /// Writes the snapshot to `path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the set has never been synchronized with a
    /// readable store, or the file cannot be written.
    pub fn save_snapshot_to(&self, path: &Path) -> CoreResult<()> {
        let hash = self
            .last_hash
            .ok_or_else(|| CoreError::invalid_operation("store hash unavailable"))?;
        let entries = self
            .entities
            .iter()
            .filter_map(|(key, entity)| self.lines.get(key).map(|line| (line.as_str(), entity)));
        snapshot::write(path, hash, entries, &self.index)?;
        debug!(kind = T::KIND, path = %path.display(), entities = self.entities.len(), "snapshot saved");
        Ok(())
    }

    /// Classifies the snapshot at `snapshot_path` against `store_hash`.
    #[must_use]
    pub fn probe_snapshot(snapshot_path: &Path, store_hash: Option<StoreHash>) -> SnapshotStatus {
        snapshot::status::<T>(snapshot_path, store_hash)
    }

    /// Returns the entity with `key`.
    #[must_use]
    pub fn get(&self, key: &T::Key) -> Option<&T> {
        self.entities.get(key)
    }

    /// Returns the store line the entity with `key` was read from or last
    /// written as.
    #[must_use]
    pub fn stored_line(&self, key: &T::Key) -> Option<&str> {
        self.lines.get(key).map(String::as_str)
    }

    /// Returns true if an entity has `key`.
    #[must_use]
    pub fn contains(&self, key: &T::Key) -> bool {
        self.entities.contains_key(key)
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    /// Returns true if the set holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// Iterates over the entities in key order.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entities.values()
    }

    /// Iterates over the keys in order.
    pub fn keys(&self) -> impl Iterator<Item = &T::Key> {
        self.entities.keys()
    }

    /// Returns a copy of every entity in key order.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.entities.values().cloned().collect()
    }

    /// Returns the search index.
    #[must_use]
    pub fn index(&self) -> &NGramIndex<T::Key> {
        &self.index
    }

    /// Returns the attached store.
    #[must_use]
    pub fn store(&self) -> Option<&LineStore> {
        self.store.as_ref()
    }

    /// Returns the store hash recorded at the last synchronization.
    #[must_use]
    pub fn last_known_hash(&self) -> Option<StoreHash> {
        self.last_hash
    }

    /// Returns how the current content was obtained.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.state
    }

    /// Returns the report of the last rebuild, if the set was rebuilt.
    #[must_use]
    pub fn last_rebuild(&self) -> Option<&RebuildReport> {
        self.last_rebuild.as_ref()
    }

    /// Returns the snapshot path.
    #[must_use]
    pub fn snapshot_path(&self) -> Option<&Path> {
        self.snapshot_path.as_deref()
    }

    /// Sets the path snapshots are saved to.
    pub fn set_snapshot_path(&mut self, path: impl Into<PathBuf>) {
        self.snapshot_path = Some(path.into());
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Clears memory and index and decodes every line of the attached store.
    fn reindex(&mut self, ctx: &T::Context<'_>) -> CoreResult<RebuildReport> {
        let store = self.store.as_mut().ok_or_else(not_attached)?;
        store.rebuild_cache()?;

        self.entities.clear();
        self.lines.clear();
        self.index.clear();
        let mut report = RebuildReport::default();

        for (i, line) in store.lines().iter().enumerate() {
            let line_no = i + 1;
            if line.trim().is_empty() {
                continue;
            }

            match T::decode(line, ctx) {
                Ok(entity) => {
                    let key = entity.key();
                    if self.entities.contains_key(&key) {
                        warn!(kind = T::KIND, line_no, %key, "skipping duplicate key");
                        report.skipped.push(SkippedLine {
                            line_no,
                            message: format!("duplicate {} key {key}", T::KIND),
                        });
                        continue;
                    }
                    self.index.add(&entity.searchable_projection(), key.clone());
                    self.lines.insert(key.clone(), line.clone());
                    self.entities.insert(key, entity);
                    report.decoded += 1;
                }
                Err(e) => {
                    warn!(kind = T::KIND, line_no, error = %e, "skipping malformed line");
                    report.skipped.push(SkippedLine {
                        line_no,
                        message: e.to_string(),
                    });
                }
            }
        }

        self.last_hash = store.hash();
        self.state = SyncState::RebuiltFromStore;
        self.last_rebuild = Some(report.clone());

        info!(
            kind = T::KIND,
            decoded = report.decoded,
            skipped = report.skipped.len(),
            "rebuilt from store"
        );

        self.autosave();
        Ok(report)
    }

    fn autosave(&self) {
        if !self.config.autosave_snapshot {
            return;
        }
        if let Some(path) = &self.snapshot_path {
            if let Err(e) = self.save_snapshot_to(path) {
                warn!(kind = T::KIND, error = %e, "failed to save snapshot");
            }
        }
    }
}

/// Returns the position of the first store line equal to `line`.
fn position_of<T: LineCodec>(
    store: &mut LineStore,
    line: &str,
    key: &T::Key,
) -> CoreResult<usize> {
    store.find_first_where(|l| l == line).ok_or_else(|| {
        warn!(kind = T::KIND, %key, "entity line missing from store");
        CoreError::line_missing(T::KIND, key.to_string())
    })
}

fn not_attached() -> CoreError {
    CoreError::invalid_operation("entity set has no store attached")
}
