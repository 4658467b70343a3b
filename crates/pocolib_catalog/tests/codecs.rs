//! Line codec properties for books, users and lendings.

use chrono::NaiveDate;
use pocolib_catalog::{Book, Lending, LendingContext, User};
use pocolib_core::{Config, EntitySet, LineCodec};
use proptest::prelude::*;
use std::fs;
use tempfile::tempdir;

fn text() -> impl Strategy<Value = String> {
    "[a-zA-Z0-9 ,.:!?'-]{0,24}"
}

fn name() -> impl Strategy<Value = String> {
    "[A-Z][a-z .'-]{0,10}[a-z]"
}

fn book_strategy() -> impl Strategy<Value = Book> {
    (
        text(),
        proptest::collection::vec(name(), 0..4),
        "[0-9X-]{1,13}",
        any::<i32>(),
        1u32..50,
        0usize..4,
    )
        .prop_map(|(title, authors, isbn, year, copies, lent)| {
            let mut book = Book::new(title, authors, isbn, year, copies).unwrap();
            for _ in 0..lent.min(copies as usize) {
                book.lend_copy().unwrap();
            }
            book
        })
}

fn user_strategy() -> impl Strategy<Value = User> {
    (
        "[A-Za-z0-9-]{1,8}",
        name(),
        name(),
        "[a-z.]{1,10}@[a-z]{1,8}\\.[a-z]{2,3}",
        0usize..5,
    )
        .prop_map(|(id, first, last, email, borrowed)| {
            let mut user = User::new(id, first, last, email).unwrap();
            for _ in 0..borrowed {
                user.borrow_book().unwrap();
            }
            user
        })
}

fn date_strategy() -> impl Strategy<Value = NaiveDate> {
    (1900i32..2100, 1u32..=365).prop_map(|(y, d)| NaiveDate::from_yo_opt(y, d).unwrap())
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn book_lines_decode_to_the_same_book(book in book_strategy()) {
        let line = book.encode();
        prop_assert_eq!(Book::decode(&line, &()).unwrap(), book);
    }

    #[test]
    fn user_lines_decode_to_the_same_user(user in user_strategy()) {
        let line = user.encode();
        prop_assert_eq!(User::decode(&line, &()).unwrap(), user);
    }

    #[test]
    fn lending_lines_resolve_to_the_same_lending(
        book in book_strategy(),
        user in user_strategy(),
        id in 1u64..u64::MAX,
        return_date in date_strategy(),
        returned in any::<bool>(),
    ) {
        let dir = tempdir().unwrap();
        let mut books: EntitySet<Book> = EntitySet::new(Config::default());
        books.rebuild_from_store(&dir.path().join("books.db"), &()).unwrap();
        books.add_or_edit(book.clone()).unwrap();
        let mut users: EntitySet<User> = EntitySet::new(Config::default());
        users.rebuild_from_store(&dir.path().join("users.db"), &()).unwrap();
        users.add_or_edit(user.clone()).unwrap();

        let mut lending = Lending::new(id, book, user, return_date);
        if returned {
            lending.mark_returned().unwrap();
        }

        let ctx = LendingContext { books: &books, users: &users };
        prop_assert_eq!(Lending::decode(&lending.encode(), &ctx).unwrap(), lending);
    }

    #[test]
    fn padded_years_are_edited_in_place(
        book in book_strategy(),
        zeros in 1usize..4,
        title in text(),
    ) {
        let canonical = book.encode();
        let year = book.year().to_string();
        let padded_year = match year.strip_prefix('-') {
            Some(digits) => format!("-{}{digits}", "0".repeat(zeros)),
            None => format!("{}{year}", "0".repeat(zeros)),
        };
        let mut fields: Vec<&str> = canonical.split('\u{1c}').collect();
        fields[3] = &padded_year;
        let padded = fields.join("\u{1c}");
        prop_assert_ne!(&padded, &canonical);
        prop_assert_eq!(Book::decode(&padded, &()).unwrap(), book.clone());

        let dir = tempdir().unwrap();
        let path = dir.path().join("books.db");
        fs::write(&path, format!("{padded}\n")).unwrap();

        let mut books: EntitySet<Book> = EntitySet::new(Config::default());
        books.rebuild_from_store(&path, &()).unwrap();
        let mut edited = book.clone();
        edited.set_title(title).unwrap();
        books.add_or_edit(edited.clone()).unwrap();

        let mut reread: EntitySet<Book> = EntitySet::new(Config::default());
        let report = reread.rebuild_from_store(&path, &()).unwrap();
        prop_assert!(report.is_clean());
        prop_assert_eq!(reread.to_vec(), vec![edited]);
    }
}
