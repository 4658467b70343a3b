//! Search command implementation.

use pocolib_catalog::{Book, Collection, Lending, Library, LibraryConfig, User};
use pocolib_core::Config;
use serde::Serialize;
use std::path::Path;

/// One search hit, flattened for display.
#[derive(Debug, Serialize)]
pub struct Hit {
    /// Entity key.
    pub key: String,
    /// Number of matching trigrams.
    pub hits: usize,
    /// Human-readable summary.
    pub summary: String,
}

/// Runs the search command.
pub fn run(
    dir: &Path,
    collection: Collection,
    query: &str,
    limit: Option<usize>,
    format: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let config =
        LibraryConfig::new(dir).with_core(Config::new().autosave_snapshot(false));
    let library = Library::open(config)?;

    let hits = collect_hits(&library, collection, query, limit.unwrap_or(usize::MAX));

    match format {
        "json" => {
            println!("{}", serde_json::to_string_pretty(&hits)?);
        }
        _ => {
            if hits.is_empty() {
                println!("No {collection} match {query:?}");
            }
            for hit in &hits {
                println!("[{}] {} ({} hits)", hit.key, hit.summary, hit.hits);
            }
        }
    }

    Ok(())
}

fn collect_hits(library: &Library, collection: Collection, query: &str, limit: usize) -> Vec<Hit> {
    match collection {
        Collection::Books => library
            .books()
            .search_with_hits(query)
            .into_iter()
            .take(limit)
            .map(|(book, hits)| Hit {
                key: book.isbn().to_string(),
                hits,
                summary: describe_book(book),
            })
            .collect(),
        Collection::Users => library
            .users()
            .search_with_hits(query)
            .into_iter()
            .take(limit)
            .map(|(user, hits)| Hit {
                key: user.id().to_string(),
                hits,
                summary: describe_user(user),
            })
            .collect(),
        Collection::Lendings => library
            .lendings()
            .search_with_hits(query)
            .into_iter()
            .take(limit)
            .map(|(lending, hits)| Hit {
                key: lending.id().to_string(),
                hits,
                summary: describe_lending(lending),
            })
            .collect(),
    }
}

fn describe_book(book: &Book) -> String {
    format!(
        "{} by {}, {} ({}/{} available)",
        book.title(),
        book.authors_string(),
        book.year(),
        book.copies_available(),
        book.total_copies()
    )
}

fn describe_user(user: &User) -> String {
    format!(
        "{} {} <{}>, {} borrowed",
        user.name(),
        user.surname(),
        user.email(),
        user.borrowed()
    )
}

fn describe_lending(lending: &Lending) -> String {
    let state = if lending.is_returned() {
        "returned"
    } else {
        "open"
    };
    format!(
        "{} to {} until {}, {state}",
        lending.book().title(),
        lending.user().id(),
        lending.return_date()
    )
}
