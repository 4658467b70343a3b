//! Search index for entity sets.
//!
//! The index is an access path only. It is always derivable from the
//! line store and is rebuilt together with the entity set.

mod ngram;

pub use ngram::{shingles, NGramIndex, NGRAM_SIZE, PADDING_CHAR};
