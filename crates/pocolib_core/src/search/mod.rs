//! Query ranking over the trigram index.
//!
//! A query is split into shingles exactly like indexed content. Each
//! shingle bucket that holds an item adds one hit to it; items are ranked
//! by hits, and the edit distance between query and projection orders
//! items with equal hits.

mod ranker;

pub use ranker::{distance, order_by_distance, search, tally, SearchResult};
