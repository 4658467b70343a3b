//! Field checks and parsing shared by the entity codecs.

use crate::error::{CatalogError, CatalogResult};
use pocolib_core::{CoreError, CoreResult, FIELD_SEPARATOR};
use std::str::FromStr;

/// Rejects text that would break the line format.
pub(crate) fn check_text(field: &'static str, value: &str) -> CatalogResult<()> {
    if value.contains(FIELD_SEPARATOR) {
        return Err(CatalogError::invalid_field(
            field,
            "contains the field separator (U+001C)",
        ));
    }
    if value.contains(['\n', '\r']) {
        return Err(CatalogError::invalid_field(field, "contains a line break"));
    }
    Ok(())
}

/// Parses one field of a `kind` line.
pub(crate) fn parse<F: FromStr>(kind: &'static str, field: &str, value: &str) -> CoreResult<F> {
    value
        .parse()
        .map_err(|_| CoreError::malformed(kind, format!("invalid {field} {value:?}")))
}

/// Adds one to a counter of the entity `key`.
pub(crate) fn increment(counter: &'static str, key: &str, value: u32) -> CatalogResult<u32> {
    value
        .checked_add(1)
        .ok_or_else(|| CatalogError::CounterOverflow {
            counter,
            key: key.to_string(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_text_rejects_format_characters() {
        assert!(check_text("title", "Dune").is_ok());
        assert!(check_text("title", "a\u{1c}b").is_err());
        assert!(check_text("title", "a\nb").is_err());
        assert!(check_text("title", "a\rb").is_err());
    }

    #[test]
    fn parse_reports_field() {
        assert_eq!(parse::<u32>("book", "year", "1965").unwrap(), 1965);
        let err = parse::<u32>("book", "year", "-1").unwrap_err();
        assert_eq!(err.to_string(), "malformed book line: invalid year \"-1\"");
    }
}
