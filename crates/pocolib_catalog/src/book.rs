//! Books and their copy counters.

use crate::error::{CatalogError, CatalogResult};
use crate::fields::{check_text, increment, parse};
use pocolib_core::{join_fields, pad_field, split_fields, CoreResult, LineCodec};
use serde::{Deserialize, Serialize};

/// Separator between author names inside the authors field.
pub const AUTHOR_SEPARATOR: &str = "; ";

/// A catalog title, identified by ISBN.
///
/// Stored as
/// `title␜authors␜isbn␜year␜copies_available␜copies_lent␜times_lent`
/// with authors joined by [`AUTHOR_SEPARATOR`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    title: String,
    authors: Vec<String>,
    isbn: String,
    year: i32,
    copies_available: u32,
    copies_lent: u32,
    times_lent: u32,
}

impl Book {
    const FIELDS: usize = 7;

    /// Creates a book with `copies` available copies and none lent.
    ///
    /// Author names are trimmed and empty names dropped.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if a field contains a line
    /// break or the field separator, or an author name contains
    /// [`AUTHOR_SEPARATOR`].
    pub fn new(
        title: impl Into<String>,
        authors: Vec<String>,
        isbn: impl Into<String>,
        year: i32,
        copies: u32,
    ) -> CatalogResult<Self> {
        let title = title.into();
        let isbn = isbn.into();
        check_text("title", &title)?;
        check_text("isbn", &isbn)?;
        let authors = clean_authors(authors)?;

        Ok(Self {
            title,
            authors,
            isbn,
            year,
            copies_available: copies,
            copies_lent: 0,
            times_lent: 0,
        })
    }

    /// Returns the title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Returns the author names.
    #[must_use]
    pub fn authors(&self) -> &[String] {
        &self.authors
    }

    /// Returns the author names joined by [`AUTHOR_SEPARATOR`].
    #[must_use]
    pub fn authors_string(&self) -> String {
        self.authors.join(AUTHOR_SEPARATOR)
    }

    /// Returns the ISBN.
    #[must_use]
    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    /// Returns the publication year.
    #[must_use]
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Returns the number of copies on the shelf.
    #[must_use]
    pub fn copies_available(&self) -> u32 {
        self.copies_available
    }

    /// Returns the number of copies currently lent.
    #[must_use]
    pub fn copies_lent(&self) -> u32 {
        self.copies_lent
    }

    /// Returns how many times a copy was lent.
    #[must_use]
    pub fn times_lent(&self) -> u32 {
        self.times_lent
    }

    /// Returns the number of copies owned, lent or not.
    #[must_use]
    pub fn total_copies(&self) -> u32 {
        self.copies_available.saturating_add(self.copies_lent)
    }

    /// Sets the title.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if the title cannot be stored.
    pub fn set_title(&mut self, title: impl Into<String>) -> CatalogResult<()> {
        let title = title.into();
        check_text("title", &title)?;
        self.title = title;
        Ok(())
    }

    /// Replaces the author names.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if a name cannot be stored.
    pub fn set_authors(&mut self, authors: Vec<String>) -> CatalogResult<()> {
        self.authors = clean_authors(authors)?;
        Ok(())
    }

    /// Sets the publication year.
    pub fn set_year(&mut self, year: i32) {
        self.year = year;
    }

    /// Adds a copy to the shelf.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CounterOverflow`] if the shelf count is at
    /// its maximum.
    pub fn add_copy(&mut self) -> CatalogResult<()> {
        self.copies_available = increment("copies available", &self.isbn, self.copies_available)?;
        Ok(())
    }

    /// Removes a copy from the shelf.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoCopiesAvailable`] if every copy is lent.
    pub fn remove_copy(&mut self) -> CatalogResult<()> {
        if self.copies_available == 0 {
            return Err(CatalogError::NoCopiesAvailable {
                isbn: self.isbn.clone(),
            });
        }
        self.copies_available -= 1;
        Ok(())
    }

    /// Moves one copy from the shelf to a borrower.
    ///
    /// Returns the new number of copies lent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoCopiesAvailable`] if every copy is lent, or
    /// [`CatalogError::CounterOverflow`] if a lent counter is at its maximum.
    /// The book is unchanged on error.
    pub fn lend_copy(&mut self) -> CatalogResult<u32> {
        if self.copies_available == 0 {
            return Err(CatalogError::NoCopiesAvailable {
                isbn: self.isbn.clone(),
            });
        }
        let copies_lent = increment("copies lent", &self.isbn, self.copies_lent)?;
        let times_lent = increment("times lent", &self.isbn, self.times_lent)?;

        self.copies_available -= 1;
        self.copies_lent = copies_lent;
        self.times_lent = times_lent;
        Ok(self.copies_lent)
    }

    /// Moves one lent copy back to the shelf.
    ///
    /// Returns the new number of copies lent.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NoCopiesLent`] if no copy is lent, or
    /// [`CatalogError::CounterOverflow`] if the shelf count is at its maximum.
    pub fn return_copy(&mut self) -> CatalogResult<u32> {
        if self.copies_lent == 0 {
            return Err(CatalogError::NoCopiesLent {
                isbn: self.isbn.clone(),
            });
        }
        self.copies_available = increment("copies available", &self.isbn, self.copies_available)?;
        self.copies_lent -= 1;
        Ok(self.copies_lent)
    }
}

fn clean_authors(authors: Vec<String>) -> CatalogResult<Vec<String>> {
    let mut cleaned = Vec::with_capacity(authors.len());
    for author in authors {
        let author = author.trim();
        if author.is_empty() {
            continue;
        }
        check_text("author", author)?;
        if author.contains(AUTHOR_SEPARATOR.trim_end()) {
            return Err(CatalogError::invalid_field(
                "author",
                format!("{author:?} contains the author separator"),
            ));
        }
        cleaned.push(author.to_string());
    }
    Ok(cleaned)
}

impl LineCodec for Book {
    const KIND: &'static str = "book";
    type Key = String;
    type Context<'a> = ();

    fn key(&self) -> String {
        self.isbn.clone()
    }

    fn encode(&self) -> String {
        join_fields([
            self.title.clone(),
            self.authors_string(),
            self.isbn.clone(),
            self.year.to_string(),
            self.copies_available.to_string(),
            self.copies_lent.to_string(),
            self.times_lent.to_string(),
        ])
    }

    fn decode(line: &str, _ctx: &()) -> CoreResult<Self> {
        let fields = split_fields(Self::KIND, line, Self::FIELDS)?;

        let authors = if fields[1].is_empty() {
            Vec::new()
        } else {
            fields[1].split(AUTHOR_SEPARATOR).map(str::to_string).collect()
        };

        Ok(Self {
            title: fields[0].to_string(),
            authors,
            isbn: fields[2].to_string(),
            year: parse(Self::KIND, "year", fields[3])?,
            copies_available: parse(Self::KIND, "copies available", fields[4])?,
            copies_lent: parse(Self::KIND, "copies lent", fields[5])?,
            times_lent: parse(Self::KIND, "times lent", fields[6])?,
        })
    }

    fn searchable_projection(&self) -> String {
        let mut projection = pad_field(&self.isbn);
        projection.push_str(&pad_field(&self.title));
        projection.push_str(&pad_field(&self.authors_string()));
        projection.push_str(&pad_field(&self.year.to_string()));
        projection
    }
}
