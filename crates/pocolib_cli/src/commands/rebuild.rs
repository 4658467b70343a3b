//! Rebuild command implementation.

use pocolib_catalog::{Library, LibraryConfig};
use pocolib_core::RebuildReport;
use std::path::Path;
use std::time::Instant;

/// Runs the rebuild command.
pub fn run(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    println!("Rebuilding data directory {}", dir.display());
    println!();

    let start = Instant::now();
    let library = Library::open_rebuilt(LibraryConfig::new(dir))?;
    let elapsed = start.elapsed();

    print_report("books", library.books().last_rebuild());
    print_report("users", library.users().last_rebuild());
    print_report("lendings", library.lendings().last_rebuild());

    println!();
    println!("Snapshots rewritten in {:.1} ms", elapsed.as_secs_f64() * 1000.0);
    Ok(())
}

fn print_report(name: &str, report: Option<&RebuildReport>) {
    let Some(report) = report else {
        println!("{name}: not rebuilt");
        return;
    };

    println!(
        "{name}: {} decoded, {} skipped",
        report.decoded,
        report.skipped.len()
    );
    for skipped in &report.skipped {
        println!("  line {}: {}", skipped.line_no, skipped.message);
    }
}
