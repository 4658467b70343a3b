//! Trigram inverted index.
//!
//! Maps every 3-character shingle of a normalized string to the set of
//! items whose searchable projection contains it. Fixed-width shingles
//! give substring-tolerant matching for short identifiers (ISBNs, user
//! ids) as well as longer titles, without a per-query scan of the items.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Width of a shingle, in characters.
pub const NGRAM_SIZE: usize = 3;

/// Character appended to strings shorter than [`NGRAM_SIZE`] (ASCII bell).
pub const PADDING_CHAR: char = '\u{0007}';

/// Splits `text` into its shingles.
///
/// The text is trimmed and lowercased first. A normalized string shorter
/// than [`NGRAM_SIZE`] yields a single shingle padded with
/// [`PADDING_CHAR`]; an empty one yields nothing. Shingles are returned in
/// window order and may repeat.
#[must_use]
pub fn shingles(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.trim().to_lowercase().chars().collect();

    if chars.is_empty() {
        return Vec::new();
    }

    if chars.len() < NGRAM_SIZE {
        let mut padded: String = chars.iter().collect();
        for _ in chars.len()..NGRAM_SIZE {
            padded.push(PADDING_CHAR);
        }
        return vec![padded];
    }

    chars
        .windows(NGRAM_SIZE)
        .map(|window| window.iter().collect())
        .collect()
}

/// Inverted index from shingle to item keys.
///
/// Buckets that become empty are pruned, so [`NGramIndex::shingle_count`]
/// always reflects live shingles only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NGramIndex<K: Ord> {
    buckets: BTreeMap<String, BTreeSet<K>>,
}

impl<K: Ord> Default for NGramIndex<K> {
    fn default() -> Self {
        Self {
            buckets: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> NGramIndex<K> {
    /// Creates an empty index.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Indexes `item` under every shingle of `content`.
    ///
    /// Empty content indexes nothing.
    pub fn add(&mut self, content: &str, item: K) {
        for shingle in shingles(content) {
            self.buckets.entry(shingle).or_default().insert(item.clone());
        }
    }

    /// Removes `item` from every bucket.
    ///
    /// Visits the whole index; use [`NGramIndex::fast_remove`] when the
    /// indexed content is known. Returns true if the item was present.
    pub fn remove(&mut self, item: &K) -> bool {
        let mut removed = false;
        self.buckets.retain(|_, items| {
            removed |= items.remove(item);
            !items.is_empty()
        });
        removed
    }

    /// Removes `item` from the buckets of `content` only.
    ///
    /// Correct only if `content` is what was indexed for `item`; any other
    /// bucket holding the item is left untouched.
    pub fn fast_remove(&mut self, content: &str, item: &K) {
        for shingle in shingles(content) {
            if let Some(items) = self.buckets.get_mut(&shingle) {
                items.remove(item);
                if items.is_empty() {
                    self.buckets.remove(&shingle);
                }
            }
        }
    }

    /// Returns the items indexed under `shingle`.
    #[must_use]
    pub fn bucket(&self, shingle: &str) -> Option<&BTreeSet<K>> {
        self.buckets.get(shingle)
    }

    /// Returns true if any bucket holds `item`.
    #[must_use]
    pub fn contains_item(&self, item: &K) -> bool {
        self.buckets.values().any(|items| items.contains(item))
    }

    /// Returns the number of non-empty buckets.
    #[must_use]
    pub fn shingle_count(&self) -> usize {
        self.buckets.len()
    }

    /// Returns true if nothing is indexed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Removes every bucket.
    pub fn clear(&mut self) {
        self.buckets.clear();
    }
}
