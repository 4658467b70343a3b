//! Line terminator detection.

use std::fmt;

/// The line terminator used by a store file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LineSeparator {
    /// `\n` (Unix, modern macOS).
    Lf,
    /// `\r\n` (Windows).
    CrLf,
    /// Lone `\r` (classic Mac OS).
    Cr,
}

impl LineSeparator {
    /// Returns the terminator used by the host platform.
    #[must_use]
    pub const fn host_default() -> Self {
        if cfg!(windows) {
            Self::CrLf
        } else {
            Self::Lf
        }
    }

    /// Detects the terminator from the first one found in `bytes`.
    ///
    /// Returns `None` when the content holds no terminator at all.
    #[must_use]
    pub fn detect(bytes: &[u8]) -> Option<Self> {
        let pos = bytes.iter().position(|&b| b == b'\n' || b == b'\r')?;
        if bytes[pos] == b'\n' {
            return Some(Self::Lf);
        }
        match bytes.get(pos + 1) {
            Some(b'\n') => Some(Self::CrLf),
            _ => Some(Self::Cr),
        }
    }

    /// Returns the terminator as a string slice.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Lf => "\n",
            Self::CrLf => "\r\n",
            Self::Cr => "\r",
        }
    }

    /// Returns a short human-readable name (`LF`, `CRLF`, `CR`).
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Lf => "LF",
            Self::CrLf => "CRLF",
            Self::Cr => "CR",
        }
    }
}

impl fmt::Display for LineSeparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Splits text into lines, accepting `\n`, `\r\n` and lone `\r`.
///
/// A trailing terminator does not produce an empty final line.
pub(crate) fn split_lines(text: &str) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\n' => lines.push(std::mem::take(&mut current)),
            '\r' => {
                if chars.peek() == Some(&'\n') {
                    chars.next();
                }
                lines.push(std::mem::take(&mut current));
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_lf() {
        assert_eq!(LineSeparator::detect(b"a\nb\r\n"), Some(LineSeparator::Lf));
    }

    #[test]
    fn detect_crlf() {
        assert_eq!(LineSeparator::detect(b"a\r\nb\n"), Some(LineSeparator::CrLf));
    }

    #[test]
    fn detect_lone_cr() {
        assert_eq!(LineSeparator::detect(b"a\rb"), Some(LineSeparator::Cr));
        assert_eq!(LineSeparator::detect(b"abc\r"), Some(LineSeparator::Cr));
    }

    #[test]
    fn detect_none() {
        assert_eq!(LineSeparator::detect(b"single line"), None);
        assert_eq!(LineSeparator::detect(b""), None);
    }

    #[test]
    fn split_mixed_terminators() {
        let lines = split_lines("a\nb\r\nc\rd");
        assert_eq!(lines, vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn split_trailing_terminator() {
        assert_eq!(split_lines("a\nb\n"), vec!["a", "b"]);
        assert!(split_lines("").is_empty());
    }

    #[test]
    fn split_keeps_blank_lines() {
        assert_eq!(split_lines("a\n\nb\n"), vec!["a", "", "b"]);
    }
}
