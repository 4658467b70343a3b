//! Entity set configuration.

use pocolib_storage::StoreOptions;

/// Configuration shared by the entity sets of one data directory.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether to rewrite the snapshot after every successful mutation.
    ///
    /// When disabled, snapshots are only written by an explicit save.
    pub autosave_snapshot: bool,

    /// Options for the line store behind each set.
    pub store: StoreOptions,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            autosave_snapshot: true,
            store: StoreOptions::default(),
        }
    }
}

impl Config {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether snapshots are saved after every mutation.
    #[must_use]
    pub const fn autosave_snapshot(mut self, value: bool) -> Self {
        self.autosave_snapshot = value;
        self
    }

    /// Sets the line store options.
    #[must_use]
    pub fn store_options(mut self, options: StoreOptions) -> Self {
        self.store = options;
        self
    }
}
