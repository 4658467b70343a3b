//! Line codec trait for store-backed entity sets.

use crate::error::{CoreError, CoreResult};
use crate::index::{NGRAM_SIZE, PADDING_CHAR};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::{Debug, Display};

/// Character joining the encoded fields of one line (ASCII file separator).
///
/// It never occurs in user-entered text.
pub const FIELD_SEPARATOR: char = '\u{001C}';

/// Trait for types that can be stored one-per-line in a [`crate::LineStore`].
///
/// Implementors must provide:
/// - `key()`: the identity used for upserts and removals
/// - `encode()`: the line written to the store
/// - `decode()`: the inverse of `encode`, resolving references through `Context`
/// - `searchable_projection()`: the text fed to the trigram index
///
/// `encode` and `decode` must be mutual inverses on well-formed input, and
/// `decode` must reject a malformed line with an error rather than produce
/// a partial entity.
///
/// The serde bounds let an [`crate::EntitySet`] write its entities into a
/// snapshot.
///
/// # Example
///
/// ```rust
/// use pocolib_core::{join_fields, pad_field, split_fields, CoreError, CoreResult, LineCodec};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// struct Tag {
///     code: String,
///     label: String,
/// }
///
/// impl LineCodec for Tag {
///     const KIND: &'static str = "tag";
///     type Key = String;
///     type Context<'a> = ();
///
///     fn key(&self) -> String {
///         self.code.clone()
///     }
///
///     fn encode(&self) -> String {
///         join_fields([self.code.as_str(), self.label.as_str()])
///     }
///
///     fn decode(line: &str, _ctx: &()) -> CoreResult<Self> {
///         let fields = split_fields(Self::KIND, line, 2)?;
///         Ok(Tag { code: fields[0].to_string(), label: fields[1].to_string() })
///     }
///
///     fn searchable_projection(&self) -> String {
///         pad_field(&self.code) + &pad_field(&self.label)
///     }
/// }
///
/// let tag = Tag { code: "rs".into(), label: "Rust".into() };
/// assert_eq!(Tag::decode(&tag.encode(), &()).unwrap(), tag);
/// ```
pub trait LineCodec: Sized + Clone + Serialize + DeserializeOwned {
    /// Entity kind, used in log events, errors and snapshot headers.
    const KIND: &'static str;

    /// Identity key of an entity.
    type Key: Clone + Ord + Debug + Display + Serialize + DeserializeOwned;

    /// Resolvers needed to decode a line, e.g. sets this entity refers to.
    type Context<'a>;

    /// Returns the identity key.
    fn key(&self) -> Self::Key;

    /// Encodes the entity as one line, without terminator.
    fn encode(&self) -> String;

    /// Decodes an entity from one line.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::MalformedLine`] if the line does not have the
    /// expected shape, or [`CoreError::UnresolvedReference`] if it names an
    /// entity missing from the context.
    fn decode(line: &str, ctx: &Self::Context<'_>) -> CoreResult<Self>;

    /// Returns the text indexed for search.
    ///
    /// Must not depend on anything but the entity itself.
    fn searchable_projection(&self) -> String;
}

/// Splits a line into exactly `expected` fields.
///
/// # Errors
///
/// Returns [`CoreError::MalformedLine`] tagged with `kind` if the field
/// count differs.
pub fn split_fields<'a>(
    kind: &'static str,
    line: &'a str,
    expected: usize,
) -> CoreResult<Vec<&'a str>> {
    let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
    if fields.len() != expected {
        return Err(CoreError::malformed(
            kind,
            format!("expected {expected} fields, found {}", fields.len()),
        ));
    }
    Ok(fields)
}

/// Joins fields with [`FIELD_SEPARATOR`].
pub fn join_fields<I, S>(fields: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut line = String::new();
    for (i, field) in fields.into_iter().enumerate() {
        if i > 0 {
            line.push(FIELD_SEPARATOR);
        }
        line.push_str(field.as_ref());
    }
    line
}

/// Normalizes one projection field and pads it to the n-gram width.
///
/// The field is trimmed and lowercased; if it is shorter than
/// [`NGRAM_SIZE`] characters it is padded with [`PADDING_CHAR`], so that
/// short identifiers still produce a full shingle of their own.
#[must_use]
pub fn pad_field(field: &str) -> String {
    let mut out = field.trim().to_lowercase();
    let len = out.chars().count();
    for _ in len..NGRAM_SIZE {
        out.push(PADDING_CHAR);
    }
    out
}
