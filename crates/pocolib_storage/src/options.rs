//! Options for opening a line store.

use crate::separator::LineSeparator;

/// Options controlling how a [`crate::LineStore`] opens and writes its file.
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Whether to create the file (and parent directories) if it doesn't exist.
    pub create_if_missing: bool,

    /// Whether to `fsync` the file after every rewrite.
    pub sync_on_write: bool,

    /// Terminator to use when the file holds none yet.
    ///
    /// `None` means the host platform default.
    pub default_separator: Option<LineSeparator>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            create_if_missing: true,
            sync_on_write: true,
            default_separator: None,
        }
    }
}

impl StoreOptions {
    /// Creates options with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets whether to create a missing file.
    #[must_use]
    pub const fn create_if_missing(mut self, value: bool) -> Self {
        self.create_if_missing = value;
        self
    }

    /// Sets whether to sync after every rewrite.
    #[must_use]
    pub const fn sync_on_write(mut self, value: bool) -> Self {
        self.sync_on_write = value;
        self
    }

    /// Sets the terminator used for files without one.
    #[must_use]
    pub const fn default_separator(mut self, separator: LineSeparator) -> Self {
        self.default_separator = Some(separator);
        self
    }

    pub(crate) fn fallback_separator(&self) -> LineSeparator {
        self.default_separator
            .unwrap_or_else(LineSeparator::host_default)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_options() {
        let options = StoreOptions::default();
        assert!(options.create_if_missing);
        assert!(options.sync_on_write);
        assert_eq!(options.fallback_separator(), LineSeparator::host_default());
    }

    #[test]
    fn builder_pattern() {
        let options = StoreOptions::new()
            .create_if_missing(false)
            .sync_on_write(false)
            .default_separator(LineSeparator::CrLf);

        assert!(!options.create_if_missing);
        assert!(!options.sync_on_write);
        assert_eq!(options.fallback_separator(), LineSeparator::CrLf);
    }
}
