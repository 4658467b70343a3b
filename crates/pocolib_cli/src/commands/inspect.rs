//! Inspect command implementation.

use pocolib_catalog::{Book, Collection, Lending, LibraryConfig, User};
use pocolib_core::{EntitySet, SnapshotStatus, StoreHash};
use pocolib_storage::{LineStore, StoreOptions};
use serde::Serialize;
use std::path::Path;

/// Inspection result for one data directory.
#[derive(Debug, Serialize)]
pub struct InspectResult {
    /// Data directory.
    pub path: String,
    /// Per-collection state.
    pub collections: Vec<CollectionReport>,
}

/// State of one collection's files.
#[derive(Debug, Serialize)]
pub struct CollectionReport {
    /// Collection name.
    pub name: String,
    /// Store file path.
    pub store: String,
    /// Whether the store file exists.
    pub exists: bool,
    /// Store file size in bytes.
    pub size: u64,
    /// Number of lines in the store.
    pub lines: usize,
    /// Detected line terminator.
    pub separator: String,
    /// Hex store hash, if the store could be read.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Snapshot state relative to the store.
    pub snapshot: String,
}

/// Runs the inspect command.
pub fn run(dir: &Path, format: &str) -> Result<(), Box<dyn std::error::Error>> {
    if !dir.is_dir() {
        return Err(format!("No data directory found at {}", dir.display()).into());
    }

    let config = LibraryConfig::new(dir);
    let mut result = InspectResult {
        path: dir.display().to_string(),
        collections: Vec::with_capacity(Collection::ALL.len()),
    };

    for collection in Collection::ALL {
        result.collections.push(inspect_collection(&config, collection)?);
    }

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&result)?);
        }
        _ => {
            print_text_output(&result);
        }
    }

    Ok(())
}

fn inspect_collection(
    config: &LibraryConfig,
    collection: Collection,
) -> Result<CollectionReport, Box<dyn std::error::Error>> {
    let store_path = config.store_path(collection);
    let snapshot_path = config.snapshot_path(collection);

    let mut report = CollectionReport {
        name: collection.to_string(),
        store: store_path.display().to_string(),
        exists: store_path.exists(),
        size: 0,
        lines: 0,
        separator: String::from("-"),
        hash: None,
        snapshot: String::new(),
    };

    let mut hash = None;
    if report.exists {
        report.size = store_path.metadata()?.len();
        let mut store =
            LineStore::open_with_options(&store_path, StoreOptions::new().create_if_missing(false))?;
        hash = store.force_hash();
        report.lines = store.len();
        report.separator = store.separator().name().to_string();
        report.hash = hash.map(|h| h.to_hex());
    }

    report.snapshot = snapshot_status(collection, &snapshot_path, hash).to_string();
    Ok(report)
}

fn snapshot_status(
    collection: Collection,
    snapshot_path: &Path,
    hash: Option<StoreHash>,
) -> SnapshotStatus {
    match collection {
        Collection::Books => EntitySet::<Book>::probe_snapshot(snapshot_path, hash),
        Collection::Users => EntitySet::<User>::probe_snapshot(snapshot_path, hash),
        Collection::Lendings => EntitySet::<Lending>::probe_snapshot(snapshot_path, hash),
    }
}

fn print_text_output(result: &InspectResult) {
    println!("PocoLib Data Inspection");
    println!("=======================");
    println!();
    println!("Path: {}", result.path);

    for col in &result.collections {
        println!();
        println!("{}:", col.name);
        if !col.exists {
            println!("  Store:     missing ({})", col.store);
            println!("  Snapshot:  {}", col.snapshot);
            continue;
        }
        println!("  Store:     {}", col.store);
        println!("  Size:      {}", format_size(col.size));
        println!("  Lines:     {}", col.lines);
        println!("  Separator: {}", col.separator);
        println!("  Hash:      {}", col.hash.as_deref().unwrap_or("unavailable"));
        println!("  Snapshot:  {}", col.snapshot);
    }
}

fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{bytes} bytes")
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
