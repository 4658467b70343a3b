//! PocoLib CLI
//!
//! Maintenance tools for a PocoLib data directory.
//!
//! # Commands
//!
//! - `inspect` - Show line counts, store hashes and snapshot status
//! - `verify` - Decode every store line and report the malformed ones
//! - `search` - Run a trigram search over one collection
//! - `rebuild` - Rebuild every collection from its store and rewrite snapshots

mod commands;

use clap::{Parser, Subcommand, ValueEnum};
use pocolib_catalog::Collection;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// PocoLib command-line data tools.
#[derive(Parser)]
#[command(name = "pocolib")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the data directory
    #[arg(global = true, short, long)]
    dir: Option<PathBuf>,

    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show store and snapshot state of every collection
    Inspect {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Decode every store line and report malformed ones
    Verify,

    /// Search one collection
    Search {
        /// Collection to search
        #[arg(value_enum)]
        collection: CollectionArg,

        /// Search text
        query: String,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<usize>,

        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Rebuild every collection from its store and rewrite the snapshots
    Rebuild,

    /// Show version information
    Version,
}

#[derive(Clone, Copy, ValueEnum)]
enum CollectionArg {
    Books,
    Users,
    Lendings,
}

impl From<CollectionArg> for Collection {
    fn from(arg: CollectionArg) -> Self {
        match arg {
            CollectionArg::Books => Self::Books,
            CollectionArg::Users => Self::Users,
            CollectionArg::Lendings => Self::Lendings,
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Inspect { format } => {
            let dir = cli.dir.ok_or("Data directory required for inspect")?;
            commands::inspect::run(&dir, &format)?;
        }
        Commands::Verify => {
            let dir = cli.dir.ok_or("Data directory required for verify")?;
            commands::verify::run(&dir)?;
        }
        Commands::Search {
            collection,
            query,
            limit,
            format,
        } => {
            let dir = cli.dir.ok_or("Data directory required for search")?;
            commands::search::run(&dir, collection.into(), &query, limit, &format)?;
        }
        Commands::Rebuild => {
            let dir = cli.dir.ok_or("Data directory required for rebuild")?;
            commands::rebuild::run(&dir)?;
        }
        Commands::Version => {
            println!("PocoLib CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("PocoLib Core v{}", pocolib_core::VERSION);
        }
    }

    Ok(())
}
