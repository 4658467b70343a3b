//! Benchmark utilities.

#![deny(unsafe_code)]
#![warn(missing_docs)]

use pocolib_catalog::Book;
use pocolib_core::{LineCodec, NGramIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

const WORDS: &[&str] = &[
    "rust", "systems", "programming", "language", "advanced", "practical", "guide", "java",
    "python", "history", "modern", "library", "network", "design", "patterns", "data",
    "algorithms", "introduction", "poetry", "novel", "science", "world", "ancient", "garden",
];

const NAMES: &[&str] = &[
    "Ada", "Alan", "Grace", "Edsger", "Barbara", "Donald", "Frances", "Niklaus", "Margaret",
    "Ken", "Radia", "John",
];

/// Returns a generator with a fixed seed, so runs are comparable.
pub fn rng() -> StdRng {
    StdRng::seed_from_u64(0x706f_636f)
}

/// Generates a phrase of `words` random words.
pub fn random_phrase(rng: &mut StdRng, words: usize) -> String {
    (0..words)
        .filter_map(|_| WORDS.choose(rng).copied())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Generates `count` books with distinct ISBNs.
pub fn generate_books(count: usize) -> Vec<Book> {
    let mut rng = rng();
    (0..count)
        .filter_map(|i| {
            let words = rng.gen_range(1..=5);
            let title = random_phrase(&mut rng, words);
            let author = format!(
                "{} {}",
                NAMES.choose(&mut rng).copied().unwrap_or("Anonymous"),
                random_phrase(&mut rng, 1)
            );
            let year = rng.gen_range(1800..=2025);
            Book::new(title, vec![author], format!("978{i:010}"), year, 3).ok()
        })
        .collect()
}

/// Builds a trigram index over the projections of `books`.
pub fn index_books(books: &[Book]) -> NGramIndex<String> {
    let mut index = NGramIndex::new();
    for book in books {
        index.add(&book.searchable_projection(), book.key());
    }
    index
}

/// Generates `count` store lines of roughly `len` characters.
pub fn generate_lines(count: usize, len: usize) -> Vec<String> {
    let mut rng = rng();
    (0..count)
        .map(|i| {
            let mut line = format!("{i}:");
            while line.len() < len {
                line.push(' ');
                line.push_str(WORDS.choose(&mut rng).copied().unwrap_or("x"));
            }
            line
        })
        .collect()
}
