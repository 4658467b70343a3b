//! Auto-increment identifier sequence.

/// An owned sequence of `u64` identifiers.
///
/// A sequence is seeded from the identifiers already in use, so restarting
/// never hands out an identifier twice. Identifiers start at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdSequence {
    next: u64,
}

impl Default for IdSequence {
    fn default() -> Self {
        Self { next: 1 }
    }
}

impl IdSequence {
    /// Creates a sequence starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a sequence continuing after the largest of `ids`.
    pub fn seeded_from<I>(ids: I) -> Self
    where
        I: IntoIterator<Item = u64>,
    {
        let mut sequence = Self::new();
        for id in ids {
            sequence.observe(id);
        }
        sequence
    }

    /// Returns the identifier the next call to [`IdSequence::next_id`] yields.
    #[must_use]
    pub const fn peek(&self) -> u64 {
        self.next
    }

    /// Returns a fresh identifier and advances the sequence.
    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next = self.next.saturating_add(1);
        id
    }

    /// Advances the sequence past `id` if it is not already.
    pub fn observe(&mut self, id: u64) {
        if id >= self.next {
            self.next = id.saturating_add(1);
        }
    }
}
