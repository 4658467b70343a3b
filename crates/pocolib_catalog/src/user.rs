//! Library users.

use crate::error::{CatalogError, CatalogResult};
use crate::fields::{check_text, increment, parse};
use pocolib_core::{join_fields, pad_field, split_fields, CoreResult, LineCodec};
use serde::{Deserialize, Serialize};

/// A registered borrower, identified by id.
///
/// Stored as `id␜name␜surname␜email␜borrowed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: String,
    name: String,
    surname: String,
    email: String,
    borrowed: u32,
}

impl User {
    const FIELDS: usize = 5;

    /// Creates a user with no borrowed books.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if a field contains a line
    /// break or the field separator.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        surname: impl Into<String>,
        email: impl Into<String>,
    ) -> CatalogResult<Self> {
        let user = Self {
            id: id.into(),
            name: name.into(),
            surname: surname.into(),
            email: email.into(),
            borrowed: 0,
        };
        check_text("id", &user.id)?;
        check_text("name", &user.name)?;
        check_text("surname", &user.surname)?;
        check_text("email", &user.email)?;
        Ok(user)
    }

    /// Returns the id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Returns the first name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the surname.
    #[must_use]
    pub fn surname(&self) -> &str {
        &self.surname
    }

    /// Returns the email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the number of books currently borrowed.
    #[must_use]
    pub fn borrowed(&self) -> u32 {
        self.borrowed
    }

    /// Sets the first name.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if the name cannot be stored.
    pub fn set_name(&mut self, name: impl Into<String>) -> CatalogResult<()> {
        let name = name.into();
        check_text("name", &name)?;
        self.name = name;
        Ok(())
    }

    /// Sets the surname.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if the surname cannot be stored.
    pub fn set_surname(&mut self, surname: impl Into<String>) -> CatalogResult<()> {
        let surname = surname.into();
        check_text("surname", &surname)?;
        self.surname = surname;
        Ok(())
    }

    /// Sets the email address.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] if the address cannot be stored.
    pub fn set_email(&mut self, email: impl Into<String>) -> CatalogResult<()> {
        let email = email.into();
        check_text("email", &email)?;
        self.email = email;
        Ok(())
    }

    /// Records one more borrowed book.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::CounterOverflow`] if the count is at its
    /// maximum.
    pub fn borrow_book(&mut self) -> CatalogResult<()> {
        self.borrowed = increment("borrowed count", &self.id, self.borrowed)?;
        Ok(())
    }

    /// Records one borrowed book given back.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NothingBorrowed`] if the user holds no book.
    pub fn give_back(&mut self) -> CatalogResult<()> {
        if self.borrowed == 0 {
            return Err(CatalogError::NothingBorrowed {
                user_id: self.id.clone(),
            });
        }
        self.borrowed -= 1;
        Ok(())
    }
}

impl LineCodec for User {
    const KIND: &'static str = "user";
    type Key = String;
    type Context<'a> = ();

    fn key(&self) -> String {
        self.id.clone()
    }

    fn encode(&self) -> String {
        join_fields([
            self.id.as_str(),
            self.name.as_str(),
            self.surname.as_str(),
            self.email.as_str(),
            self.borrowed.to_string().as_str(),
        ])
    }

    fn decode(line: &str, _ctx: &()) -> CoreResult<Self> {
        let fields = split_fields(Self::KIND, line, Self::FIELDS)?;
        Ok(Self {
            id: fields[0].to_string(),
            name: fields[1].to_string(),
            surname: fields[2].to_string(),
            email: fields[3].to_string(),
            borrowed: parse(Self::KIND, "borrowed count", fields[4])?,
        })
    }

    fn searchable_projection(&self) -> String {
        [&self.id, &self.name, &self.surname, &self.email]
            .into_iter()
            .map(|field| pad_field(field))
            .collect()
    }
}
