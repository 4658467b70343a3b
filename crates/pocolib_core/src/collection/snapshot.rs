//! Snapshot persistence for entity sets.
//!
//! A snapshot saves the decoded entities, the store line each was read
//! from, and the trigram index so that startup can skip re-parsing the
//! store.
//!
//! ## Format
//!
//! ```text
//! Snapshot {
//!     magic: [0x50, 0x4C, 0x53, 0x4E] // "PLSN"
//!     version: u8
//!     payload: CBOR {
//!         kind: String        // LineCodec::KIND
//!         store_hash: String  // hex SHA-256 of the store it was taken from
//!         entries: [(line, entity)]
//!         index: NGramIndex
//!     }
//! }
//! ```
//!
//! ## Invariants
//!
//! - A snapshot is an optimization, never the source of truth
//! - It is trusted only if its store hash equals the live store's hash
//! - Any problem reading it triggers a rebuild, not an error

use crate::codec::LineCodec;
use crate::collection::state::SnapshotStatus;
use crate::error::{CoreError, CoreResult};
use crate::index::NGramIndex;
use pocolib_storage::StoreHash;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Magic bytes for snapshot files: "PLSN"
const SNAPSHOT_MAGIC: [u8; 4] = [0x50, 0x4C, 0x53, 0x4E];

/// Current snapshot format version.
const SNAPSHOT_VERSION: u8 = 2;

const HEADER_LEN: usize = SNAPSHOT_MAGIC.len() + 1;

#[derive(Serialize)]
#[serde(bound = "")]
struct SnapshotOut<'a, T: LineCodec> {
    kind: &'a str,
    store_hash: String,
    entries: Vec<(&'a str, &'a T)>,
    index: &'a NGramIndex<T::Key>,
}

#[derive(Deserialize)]
#[serde(bound = "")]
struct SnapshotIn<T: LineCodec> {
    kind: String,
    store_hash: String,
    entries: Vec<(String, T)>,
    index: NGramIndex<T::Key>,
}

/// A snapshot read back from disk.
pub(crate) struct Snapshot<T: LineCodec> {
    pub store_hash: StoreHash,
    /// Stored line and decoded entity, in key order.
    pub entries: Vec<(String, T)>,
    pub index: NGramIndex<T::Key>,
}

/// Writes a snapshot atomically through a sibling temp file.
pub(crate) fn write<'a, T, I>(
    path: &Path,
    store_hash: StoreHash,
    entries: I,
    index: &'a NGramIndex<T::Key>,
) -> CoreResult<()>
where
    T: LineCodec + 'a,
    I: IntoIterator<Item = (&'a str, &'a T)>,
{
    let payload = SnapshotOut::<T> {
        kind: T::KIND,
        store_hash: store_hash.to_hex(),
        entries: entries.into_iter().collect(),
        index,
    };

    let mut bytes = Vec::with_capacity(4096);
    bytes.extend_from_slice(&SNAPSHOT_MAGIC);
    bytes.push(SNAPSHOT_VERSION);
    ciborium::into_writer(&payload, &mut bytes)
        .map_err(|e| CoreError::invalid_snapshot(format!("encoding failed: {e}")))?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let temp_path = temp_path(path);
    let result = write_synced(&temp_path, &bytes).and_then(|()| fs::rename(&temp_path, path));
    if let Err(e) = result {
        let _ = fs::remove_file(&temp_path);
        return Err(e.into());
    }

    Ok(())
}

/// Reads and validates a snapshot for entity kind `T`.
pub(crate) fn read<T: LineCodec>(path: &Path) -> CoreResult<Snapshot<T>> {
    let data = fs::read(path).map_err(|e| {
        CoreError::invalid_snapshot(format!("cannot read {}: {e}", path.display()))
    })?;

    if data.len() < HEADER_LEN {
        return Err(CoreError::invalid_snapshot("snapshot file too small"));
    }

    if data[0..4] != SNAPSHOT_MAGIC {
        return Err(CoreError::invalid_snapshot("invalid snapshot magic"));
    }

    let version = data[4];
    if version != SNAPSHOT_VERSION {
        return Err(CoreError::invalid_snapshot(format!(
            "unsupported snapshot version: {version}"
        )));
    }

    let payload: SnapshotIn<T> = ciborium::from_reader(&data[HEADER_LEN..])
        .map_err(|e| CoreError::invalid_snapshot(format!("decoding failed: {e}")))?;

    if payload.kind != T::KIND {
        return Err(CoreError::invalid_snapshot(format!(
            "snapshot holds {} entities, expected {}",
            payload.kind,
            T::KIND
        )));
    }

    let store_hash = payload
        .store_hash
        .parse::<StoreHash>()
        .map_err(|e| CoreError::invalid_snapshot(e.to_string()))?;

    Ok(Snapshot {
        store_hash,
        entries: payload.entries,
        index: payload.index,
    })
}

/// Classifies the snapshot at `path` against the store hash `current`.
pub(crate) fn status<T: LineCodec>(path: &Path, current: Option<StoreHash>) -> SnapshotStatus {
    if !path.exists() {
        return SnapshotStatus::Missing;
    }

    match read::<T>(path) {
        Ok(snapshot) if Some(snapshot.store_hash) == current => SnapshotStatus::Fresh,
        Ok(_) => SnapshotStatus::Stale,
        Err(e) => SnapshotStatus::Invalid(e.to_string()),
    }
}

fn write_synced(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)?;
    file.write_all(data)?;
    file.sync_all()
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().map(|n| n.to_os_string()).unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}
