//! Content digest used for staleness detection.

use crate::separator::LineSeparator;
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// SHA-256 digest over a store's ordered lines and its line terminator.
///
/// Each line contributes its bytes followed by the terminator, which is
/// exactly the byte layout [`crate::LineStore`] writes to disk. The digest
/// is used only to notice that a file changed; it is never an identity.
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct StoreHash([u8; 32]);

/// Error returned when parsing a [`StoreHash`] from hex fails.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid store hash: {0}")]
pub struct HashParseError(String);

impl StoreHash {
    /// Creates a hash from raw digest bytes.
    #[inline]
    #[must_use]
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Returns the raw digest bytes.
    #[inline]
    #[must_use]
    pub const fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Computes the digest of `lines` joined by `separator`.
    #[must_use]
    pub fn of_lines<S: AsRef<str>>(lines: &[S], separator: LineSeparator) -> Self {
        let mut hasher = Sha256::new();
        for line in lines {
            hasher.update(line.as_ref().as_bytes());
            hasher.update(separator.as_str().as_bytes());
        }
        Self(hasher.finalize().into())
    }

    /// Returns the digest as lowercase hex.
    #[must_use]
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }
}

impl FromStr for StoreHash {
    type Err = HashParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.len() != 64 || !s.is_ascii() {
            return Err(HashParseError(s.to_string()));
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16)
                .map_err(|_| HashParseError(s.to_string()))?;
        }
        Ok(Self(bytes))
    }
}

impl fmt::Debug for StoreHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StoreHash({})", self.to_hex())
    }
}

impl fmt::Display for StoreHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}
