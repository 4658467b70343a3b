//! Lendings of a book copy to a user.

use crate::book::Book;
use crate::error::{CatalogError, CatalogResult};
use crate::fields::parse;
use crate::user::User;
use chrono::NaiveDate;
use pocolib_core::{
    join_fields, pad_field, split_fields, CoreError, CoreResult, EntitySet, LineCodec,
    FIELD_SEPARATOR,
};
use serde::{Deserialize, Serialize};

/// Sets a lending line is resolved against.
#[derive(Debug, Clone, Copy)]
pub struct LendingContext<'a> {
    /// Books, looked up by ISBN.
    pub books: &'a EntitySet<Book>,
    /// Users, looked up by id.
    pub users: &'a EntitySet<User>,
}

/// A copy of a book lent to a user until a return date.
///
/// Stored as `id␜isbn␜user_id␜YYYY-MM-DD␜returned`. Decoding resolves the
/// ISBN and user id against a [`LendingContext`]; the lending then holds
/// copies of the book and user, which [`crate::Library`] refreshes on every
/// write to either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lending {
    id: u64,
    book: Book,
    user: User,
    return_date: NaiveDate,
    returned: bool,
}

impl Lending {
    const FIELDS: usize = 5;

    /// Creates an open lending.
    #[must_use]
    pub fn new(id: u64, book: Book, user: User, return_date: NaiveDate) -> Self {
        Self {
            id,
            book,
            user,
            return_date,
            returned: false,
        }
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Returns the lent book.
    #[must_use]
    pub fn book(&self) -> &Book {
        &self.book
    }

    /// Returns the borrowing user.
    #[must_use]
    pub fn user(&self) -> &User {
        &self.user
    }

    /// Returns the date the copy is due back.
    #[must_use]
    pub fn return_date(&self) -> NaiveDate {
        self.return_date
    }

    /// Returns true if the copy was given back.
    #[must_use]
    pub fn is_returned(&self) -> bool {
        self.returned
    }

    /// Returns true if the copy is still out after its return date.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.returned && today > self.return_date
    }

    /// Moves the return date.
    pub fn set_return_date(&mut self, return_date: NaiveDate) {
        self.return_date = return_date;
    }

    /// Closes the lending.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::AlreadyReturned`] if it was already closed.
    pub fn mark_returned(&mut self) -> CatalogResult<()> {
        if self.returned {
            return Err(CatalogError::AlreadyReturned { id: self.id });
        }
        self.returned = true;
        Ok(())
    }

    /// Reads the id field of a lending line without resolving its book or
    /// user.
    pub(crate) fn id_of_line(line: &str) -> Option<u64> {
        line.split(FIELD_SEPARATOR).next()?.trim().parse().ok()
    }

    pub(crate) fn refresh_parties(&mut self, book: Book, user: User) {
        self.book = book;
        self.user = user;
    }
}

impl LineCodec for Lending {
    const KIND: &'static str = "lending";
    type Key = u64;
    type Context<'a> = LendingContext<'a>;

    fn key(&self) -> u64 {
        self.id
    }

    fn encode(&self) -> String {
        join_fields([
            self.id.to_string(),
            self.book.isbn().to_string(),
            self.user.id().to_string(),
            self.return_date.format("%Y-%m-%d").to_string(),
            self.returned.to_string(),
        ])
    }

    fn decode(line: &str, ctx: &LendingContext<'_>) -> CoreResult<Self> {
        let fields = split_fields(Self::KIND, line, Self::FIELDS)?;

        let id = parse(Self::KIND, "id", fields[0])?;
        let book = ctx
            .books
            .get(&fields[1].to_string())
            .cloned()
            .ok_or_else(|| CoreError::unresolved(Book::KIND, fields[1]))?;
        let user = ctx
            .users
            .get(&fields[2].to_string())
            .cloned()
            .ok_or_else(|| CoreError::unresolved(User::KIND, fields[2]))?;
        let return_date = NaiveDate::parse_from_str(fields[3], "%Y-%m-%d").map_err(|_| {
            CoreError::malformed(Self::KIND, format!("invalid return date {:?}", fields[3]))
        })?;
        let returned = parse(Self::KIND, "returned flag", fields[4])?;

        Ok(Self {
            id,
            book,
            user,
            return_date,
            returned,
        })
    }

    fn searchable_projection(&self) -> String {
        let mut projection = pad_field(&self.id.to_string());
        projection.push_str(&pad_field(&self.return_date.format("%Y-%m-%d").to_string()));
        projection.push_str(&self.book.searchable_projection());
        projection.push_str(&self.user.searchable_projection());
        projection
    }
}
