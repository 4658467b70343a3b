//! Hit-count ranking over an [`NGramIndex`].

use crate::index::{shingles, NGramIndex};
use std::collections::{BTreeMap, HashMap};

/// A search hit: an indexed item and how many query shingles matched it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult<K> {
    /// The matched item.
    pub item: K,
    /// Number of query shingles whose bucket holds the item.
    pub hits: usize,
}

/// Counts, per item, the query shingles that hit it.
///
/// The query is normalized like indexed content. A shingle that occurs
/// twice in the query counts twice. Results are ordered by hits
/// descending, then by item ascending. An empty query matches nothing.
#[must_use]
pub fn tally<K: Ord + Clone>(query: &str, index: &NGramIndex<K>) -> Vec<SearchResult<K>> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();

    for shingle in shingles(query) {
        if let Some(items) = index.bucket(&shingle) {
            for item in items {
                *counts.entry(item.clone()).or_insert(0) += 1;
            }
        }
    }

    let mut results: Vec<SearchResult<K>> = counts
        .into_iter()
        .map(|(item, hits)| SearchResult { item, hits })
        .collect();
    // BTreeMap iteration already yields items ascending; a stable sort keeps it.
    results.sort_by(|a, b| b.hits.cmp(&a.hits));
    results
}

/// Searches `index` for `query` and ranks the matches.
///
/// Matches are ordered by hit count descending. Ties are broken by the
/// [`distance`] between the normalized query and the item's projection,
/// as returned by `projection`, closest first; remaining ties by item.
/// Distance never decides whether an item is included.
pub fn search<K, F>(query: &str, index: &NGramIndex<K>, mut projection: F) -> Vec<SearchResult<K>>
where
    K: Ord + Clone,
    F: FnMut(&K) -> String,
{
    let normalized = query.trim().to_lowercase();

    let mut ranked: Vec<(SearchResult<K>, usize)> = tally(&normalized, index)
        .into_iter()
        .map(|result| {
            let target = projection(&result.item).trim().to_lowercase();
            let d = distance(&normalized, &target);
            (result, d)
        })
        .collect();

    ranked.sort_by(|(a, da), (b, db)| {
        b.hits
            .cmp(&a.hits)
            .then_with(|| da.cmp(db))
            .then_with(|| a.item.cmp(&b.item))
    });

    ranked.into_iter().map(|(result, _)| result).collect()
}

/// Returns the unrestricted Damerau-Levenshtein distance between `a` and `b`.
///
/// Counts insertions, deletions, substitutions and transpositions of
/// characters, allowing edits between transposed characters. The
/// comparison is case sensitive; normalize first for a case-insensitive
/// distance.
#[must_use]
pub fn distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }

    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let (n, m) = (a.len(), b.len());
    let max = n + m;

    // (n + 2) x (m + 2) matrix, row-major. Row and column 0 hold the sentinel.
    let width = m + 2;
    let at = |i: usize, j: usize| i * width + j;
    let mut h = vec![0usize; (n + 2) * width];

    h[at(0, 0)] = max;
    for i in 0..=n {
        h[at(i + 1, 0)] = max;
        h[at(i + 1, 1)] = i;
    }
    for j in 0..=m {
        h[at(0, j + 1)] = max;
        h[at(1, j + 1)] = j;
    }

    // Last row of `a` in which each character was seen.
    let mut last_row: HashMap<char, usize> = HashMap::new();

    for i in 1..=n {
        let mut last_match_col = 0;

        for j in 1..=m {
            let i1 = last_row.get(&b[j - 1]).copied().unwrap_or(0);
            let j1 = last_match_col;

            let cost = if a[i - 1] == b[j - 1] {
                last_match_col = j;
                0
            } else {
                1
            };

            let substitution = h[at(i, j)] + cost;
            let insertion = h[at(i + 1, j)] + 1;
            let deletion = h[at(i, j + 1)] + 1;
            let transposition = h[at(i1, j1)] + (i - i1 - 1) + 1 + (j - j1 - 1);

            h[at(i + 1, j + 1)] = substitution.min(insertion).min(deletion).min(transposition);
        }

        last_row.insert(a[i - 1], i);
    }

    h[at(n + 1, m + 1)]
}

/// Sorts `candidates` by [`distance`] to `query`, closest first.
///
/// The sort is stable: equally distant candidates keep their order.
pub fn order_by_distance<S: AsRef<str>>(query: &str, candidates: &mut [S]) {
    candidates.sort_by_cached_key(|candidate| distance(query, candidate.as_ref()));
}
