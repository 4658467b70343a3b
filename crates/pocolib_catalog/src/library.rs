//! The library facade over the three entity sets.

use crate::book::Book;
use crate::config::{Collection, LibraryConfig};
use crate::error::{CatalogError, CatalogResult};
use crate::lending::{Lending, LendingContext};
use crate::user::User;
use chrono::NaiveDate;
use pocolib_core::{CoreError, EntitySet, IdSequence, LineCodec, SyncState};
use tracing::{info, warn};

/// Books, users and lendings of one data directory.
///
/// Lendings name the book and user they involve, so the sets are loaded in
/// dependency order: books, users, then lendings resolved against both.
/// The lending snapshot is trusted only if the book and user snapshots
/// were; otherwise lendings are rebuilt from their store.
///
/// Operations touching several sets write them in the same order. If a
/// later write fails, the earlier ones are reverted on a best-effort basis
/// and the error is returned.
///
/// Every write to a book or user is carried into the lendings naming it,
/// so the lending set holds the same content whether it was loaded from
/// its snapshot or rebuilt from the store.
#[derive(Debug)]
pub struct Library {
    config: LibraryConfig,
    books: EntitySet<Book>,
    users: EntitySet<User>,
    lendings: EntitySet<Lending>,
    lending_ids: IdSequence,
}

impl Library {
    /// Opens the library, loading each set from its snapshot when fresh.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be opened or read.
    pub fn open(config: LibraryConfig) -> CatalogResult<Self> {
        let mut library = Self::unloaded(config);

        let books_state = library.books.load_from_snapshot(
            &library.config.snapshot_path(Collection::Books),
            &library.config.store_path(Collection::Books),
            &(),
        )?;
        let users_state = library.users.load_from_snapshot(
            &library.config.snapshot_path(Collection::Users),
            &library.config.store_path(Collection::Users),
            &(),
        )?;

        let trust_snapshot = books_state == SyncState::LoadedFromSnapshot
            && users_state == SyncState::LoadedFromSnapshot;
        library.load_lendings(trust_snapshot)?;
        library.log_opened();

        Ok(library)
    }

    /// Opens the library ignoring every snapshot, then rewrites them.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be read or a snapshot cannot be
    /// written.
    pub fn open_rebuilt(config: LibraryConfig) -> CatalogResult<Self> {
        let mut library = Self::unloaded(config);

        library
            .books
            .set_snapshot_path(library.config.snapshot_path(Collection::Books));
        library
            .books
            .rebuild_from_store(&library.config.store_path(Collection::Books), &())?;

        library
            .users
            .set_snapshot_path(library.config.snapshot_path(Collection::Users));
        library
            .users
            .rebuild_from_store(&library.config.store_path(Collection::Users), &())?;

        library.load_lendings(false)?;
        library.save_snapshots()?;
        library.log_opened();

        Ok(library)
    }

    fn unloaded(config: LibraryConfig) -> Self {
        Self {
            books: EntitySet::new(config.core.clone()),
            users: EntitySet::new(config.core.clone()),
            lendings: EntitySet::new(config.core.clone()),
            lending_ids: IdSequence::new(),
            config,
        }
    }

    fn load_lendings(&mut self, trust_snapshot: bool) -> CatalogResult<()> {
        let Self {
            config,
            books,
            users,
            lendings,
            lending_ids,
        } = self;

        let ctx = LendingContext { books, users };
        let snapshot_path = config.snapshot_path(Collection::Lendings);
        let store_path = config.store_path(Collection::Lendings);

        if trust_snapshot {
            lendings.load_from_snapshot(&snapshot_path, &store_path, &ctx)?;
        } else {
            lendings.set_snapshot_path(snapshot_path);
            lendings.rebuild_from_store(&store_path, &ctx)?;
        }

        *lending_ids = IdSequence::seeded_from(lending_ids_in(lendings));
        Ok(())
    }

    fn log_opened(&self) {
        info!(
            dir = %self.config.data_dir.display(),
            books = self.books.len(),
            users = self.users.len(),
            lendings = self.lendings.len(),
            "library opened"
        );
    }

    /// Lends a copy of the book `isbn` to the user `user_id`.
    ///
    /// Returns the new lending.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the book or user does not exist,
    /// [`CatalogError::NoCopiesAvailable`] if every copy is out,
    /// [`CatalogError::CounterOverflow`] if a counter is saturated, or a
    /// store error.
    pub fn lend(
        &mut self,
        isbn: &str,
        user_id: &str,
        return_date: NaiveDate,
    ) -> CatalogResult<Lending> {
        let original_book = self.book(isbn)?;
        let original_user = self.user(user_id)?;

        let mut book = original_book.clone();
        book.lend_copy()?;
        let mut user = original_user.clone();
        user.borrow_book()?;

        self.books.add_or_edit(book.clone())?;
        if let Err(e) = self.users.add_or_edit(user.clone()) {
            revert(&mut self.books, original_book);
            return Err(e.into());
        }

        let lending = Lending::new(self.lending_ids.peek(), book, user, return_date);
        if let Err(e) = self.lendings.add_or_edit(lending.clone()) {
            revert(&mut self.books, original_book);
            revert(&mut self.users, original_user);
            return Err(e.into());
        }
        self.lending_ids.next_id();
        self.sync_lendings(|l| l.book().isbn() == isbn || l.user().id() == user_id)?;

        info!(id = lending.id(), isbn, user_id, %return_date, "book lent");
        Ok(lending)
    }

    /// Closes the lending `id` and puts its copy back on the shelf.
    ///
    /// # Errors
    ///
    /// Returns a not-found error if the lending does not exist,
    /// [`CatalogError::AlreadyReturned`] if it was closed, or a store error.
    pub fn return_lending(&mut self, id: u64) -> CatalogResult<Lending> {
        let mut lending = self
            .lendings
            .get(&id)
            .cloned()
            .ok_or_else(|| CoreError::not_found(Lending::KIND, id.to_string()))?;
        lending.mark_returned()?;

        let original_book = self.book(lending.book().isbn())?;
        let original_user = self.user(lending.user().id())?;

        let mut book = original_book.clone();
        book.return_copy()?;
        let mut user = original_user.clone();
        user.give_back()?;

        self.books.add_or_edit(book.clone())?;
        if let Err(e) = self.users.add_or_edit(user.clone()) {
            revert(&mut self.books, original_book);
            return Err(e.into());
        }

        let isbn = book.key();
        let user_id = user.key();
        lending.refresh_parties(book, user);
        if let Err(e) = self.lendings.add_or_edit(lending.clone()) {
            revert(&mut self.books, original_book);
            revert(&mut self.users, original_user);
            return Err(e.into());
        }
        self.sync_lendings(|l| l.book().isbn() == isbn || l.user().id() == user_id)?;

        info!(id, "lending returned");
        Ok(lending)
    }

    /// Inserts a book or replaces the one with the same ISBN.
    ///
    /// Lendings naming the book are updated to embed the new version.
    /// Returns the replaced book, if any.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn add_or_edit_book(&mut self, book: Book) -> CatalogResult<Option<Book>> {
        let isbn = book.key();
        let previous = self.books.add_or_edit(book)?;
        if previous.is_some() {
            self.sync_lendings(|lending| lending.book().isbn() == isbn)?;
        }
        Ok(previous)
    }

    /// Inserts a user or replaces the one with the same id.
    ///
    /// Lendings naming the user are updated to embed the new version.
    /// Returns the replaced user, if any.
    ///
    /// # Errors
    ///
    /// Returns a store error.
    pub fn add_or_edit_user(&mut self, user: User) -> CatalogResult<Option<User>> {
        let id = user.key();
        let previous = self.users.add_or_edit(user)?;
        if previous.is_some() {
            self.sync_lendings(|lending| lending.user().id() == id)?;
        }
        Ok(previous)
    }

    /// Removes the book `isbn`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Referenced`] if a lending names the book, a
    /// not-found error if it does not exist, or a store error.
    pub fn remove_book(&mut self, isbn: &str) -> CatalogResult<Book> {
        if let Some(lending) = self.lendings.iter().find(|l| l.book().isbn() == isbn) {
            return Err(CatalogError::Referenced {
                kind: Book::KIND,
                key: isbn.to_string(),
                lending_id: lending.id(),
            });
        }
        Ok(self.books.remove(&isbn.to_string())?)
    }

    /// Removes the user `user_id`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::Referenced`] if a lending names the user, a
    /// not-found error if it does not exist, or a store error.
    pub fn remove_user(&mut self, user_id: &str) -> CatalogResult<User> {
        if let Some(lending) = self.lendings.iter().find(|l| l.user().id() == user_id) {
            return Err(CatalogError::Referenced {
                kind: User::KIND,
                key: user_id.to_string(),
                lending_id: lending.id(),
            });
        }
        Ok(self.users.remove(&user_id.to_string())?)
    }

    /// Removes a returned lending.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidOperation`] if the lending is still open,
    /// a not-found error if it does not exist, or a store error.
    pub fn remove_lending(&mut self, id: u64) -> CatalogResult<Lending> {
        let lending = self
            .lendings
            .get(&id)
            .ok_or_else(|| CoreError::not_found(Lending::KIND, id.to_string()))?;
        if !lending.is_returned() {
            return Err(CoreError::invalid_operation(format!("lending {id} is still open")).into());
        }
        Ok(self.lendings.remove(&id)?)
    }

    /// Writes the snapshot of every set.
    ///
    /// # Errors
    ///
    /// Returns an error if a snapshot cannot be written.
    pub fn save_snapshots(&self) -> CatalogResult<()> {
        self.books.save_snapshot()?;
        self.users.save_snapshot()?;
        self.lendings.save_snapshot()?;
        Ok(())
    }

    /// Rebuilds the sets whose store changed on disk.
    ///
    /// Lendings are rebuilt whenever books or users were. Returns true if
    /// any set was rebuilt.
    ///
    /// # Errors
    ///
    /// Returns an error if a store cannot be read.
    pub fn refresh(&mut self) -> CatalogResult<bool> {
        let books_changed = self.books.refresh(&())?;
        let users_changed = self.users.refresh(&())?;

        let Self {
            config,
            books,
            users,
            lendings,
            lending_ids,
        } = self;
        let ctx = LendingContext { books, users };

        let lendings_changed = if books_changed || users_changed {
            lendings.rebuild_from_store(&config.store_path(Collection::Lendings), &ctx)?;
            true
        } else {
            lendings.refresh(&ctx)?
        };
        if lendings_changed {
            for id in lending_ids_in(lendings) {
                lending_ids.observe(id);
            }
        }

        Ok(books_changed || users_changed || lendings_changed)
    }

    /// Returns the books.
    #[must_use]
    pub fn books(&self) -> &EntitySet<Book> {
        &self.books
    }

    /// Returns the users.
    #[must_use]
    pub fn users(&self) -> &EntitySet<User> {
        &self.users
    }

    /// Returns the lendings.
    #[must_use]
    pub fn lendings(&self) -> &EntitySet<Lending> {
        &self.lendings
    }

    /// Returns the lendings past their return date on `today`.
    pub fn overdue(&self, today: NaiveDate) -> impl Iterator<Item = &Lending> {
        self.lendings.iter().filter(move |l| l.is_overdue(today))
    }

    /// Returns the id the next lending will get.
    #[must_use]
    pub fn next_lending_id(&self) -> u64 {
        self.lending_ids.peek()
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    fn book(&self, isbn: &str) -> CatalogResult<Book> {
        self.books
            .get(&isbn.to_string())
            .cloned()
            .ok_or_else(|| CoreError::not_found(Book::KIND, isbn).into())
    }

    fn user(&self, user_id: &str) -> CatalogResult<User> {
        self.users
            .get(&user_id.to_string())
            .cloned()
            .ok_or_else(|| CoreError::not_found(User::KIND, user_id).into())
    }

    /// Re-embeds the current book and user into the lendings `names` selects.
    ///
    /// Lending lines hold only keys, so only memory, index and snapshot
    /// change.
    fn sync_lendings<P>(&mut self, names: P) -> CatalogResult<()>
    where
        P: Fn(&Lending) -> bool,
    {
        let stale: Vec<Lending> = self
            .lendings
            .iter()
            .filter(|l| names(*l))
            .filter(|l| {
                self.books.get(&l.book().key()) != Some(l.book())
                    || self.users.get(&l.user().key()) != Some(l.user())
            })
            .cloned()
            .collect();

        for mut lending in stale {
            let book = self.books.get(&lending.book().key()).cloned();
            let user = self.users.get(&lending.user().key()).cloned();
            if let (Some(book), Some(user)) = (book, user) {
                lending.refresh_parties(book, user);
                self.lendings.add_or_edit(lending)?;
            }
        }
        Ok(())
    }
}

/// Ids of every lending line in the store, decodable or not, plus the
/// loaded lendings.
fn lending_ids_in(lendings: &EntitySet<Lending>) -> impl Iterator<Item = u64> + '_ {
    let stored = lendings
        .store()
        .map(|store| store.lines())
        .unwrap_or_default()
        .iter()
        .filter_map(|line| Lending::id_of_line(line));
    lendings.keys().copied().chain(stored)
}

fn revert<T: LineCodec>(set: &mut EntitySet<T>, original: T) {
    let key = original.key();
    if let Err(e) = set.add_or_edit(original) {
        warn!(kind = T::KIND, %key, error = %e, "failed to revert entity");
    }
}
