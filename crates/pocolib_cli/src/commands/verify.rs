//! Verify command implementation.

use pocolib_catalog::{Book, Collection, Lending, LendingContext, LibraryConfig, User};
use pocolib_core::{Config, CoreResult, EntitySet, RebuildReport, StoreOptions};
use std::path::Path;

/// Verification result for one collection.
#[derive(Debug)]
pub struct VerifyResult {
    /// Collection checked.
    pub collection: Collection,
    /// Whether the store file exists.
    pub exists: bool,
    /// Decode report, if the store was read.
    pub report: Option<RebuildReport>,
}

impl VerifyResult {
    fn is_ok(&self) -> bool {
        self.report.as_ref().map_or(true, RebuildReport::is_clean)
    }
}

/// Runs the verify command.
pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Verifying data directory {}", dir.display());
    println!();

    let results = verify_all(dir)?;
    for result in &results {
        print_result(result);
    }

    println!();
    if results.iter().all(VerifyResult::is_ok) {
        println!("✓ Verification passed");
        Ok(())
    } else {
        println!("✗ Verification failed");
        Err("Verification failed".into())
    }
}

/// Decodes every line of every collection without writing anything.
fn verify_all(dir: &Path) -> CoreResult<Vec<VerifyResult>> {
    let config = LibraryConfig::new(dir);
    let core = Config::new()
        .autosave_snapshot(false)
        .store_options(StoreOptions::new().create_if_missing(false));

    let mut books: EntitySet<Book> = EntitySet::new(core.clone());
    let mut users: EntitySet<User> = EntitySet::new(core.clone());
    let mut lendings: EntitySet<Lending> = EntitySet::new(core);

    let books_result = check(&config, Collection::Books, |path| {
        books.rebuild_from_store(path, &())
    })?;
    let users_result = check(&config, Collection::Users, |path| {
        users.rebuild_from_store(path, &())
    })?;

    let ctx = LendingContext {
        books: &books,
        users: &users,
    };
    let lendings_result = check(&config, Collection::Lendings, |path| {
        lendings.rebuild_from_store(path, &ctx)
    })?;

    Ok(vec![books_result, users_result, lendings_result])
}

fn check<F>(config: &LibraryConfig, collection: Collection, rebuild: F) -> CoreResult<VerifyResult>
where
    F: FnOnce(&Path) -> CoreResult<RebuildReport>,
{
    let path = config.store_path(collection);
    if !path.exists() {
        return Ok(VerifyResult {
            collection,
            exists: false,
            report: None,
        });
    }

    Ok(VerifyResult {
        collection,
        exists: true,
        report: Some(rebuild(&path)?),
    })
}

fn print_result(result: &VerifyResult) {
    match &result.report {
        None => {
            println!(
                "{}: store not found (this may be normal for new data directories)",
                result.collection
            );
        }
        Some(report) => {
            println!(
                "{}: {} decoded, {} skipped",
                result.collection,
                report.decoded,
                report.skipped.len()
            );
            for skipped in &report.skipped {
                println!("  line {}: {}", skipped.line_no, skipped.message);
            }
        }
    }
}
