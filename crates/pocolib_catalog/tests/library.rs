//! Library flows: lending, returning, editing and persistence.

use chrono::NaiveDate;
use pocolib_catalog::{Book, CatalogError, Collection, Library, LibraryConfig, User};
use pocolib_core::{CoreError, LineCodec, SyncState};
use std::fs;
use std::path::Path;
use tempfile::tempdir;

const DUNE: &str = "9780441013593";
const EMMA: &str = "9780141439587";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn stocked(dir: &Path) -> Library {
    let mut library = Library::open(LibraryConfig::new(dir)).unwrap();
    library
        .add_or_edit_book(Book::new("Dune", vec!["Frank Herbert".into()], DUNE, 1965, 2).unwrap())
        .unwrap();
    library
        .add_or_edit_book(Book::new("Emma", vec!["Jane Austen".into()], EMMA, 1815, 1).unwrap())
        .unwrap();
    library
        .add_or_edit_user(User::new("U01", "Ada", "Lovelace", "ada@example.org").unwrap())
        .unwrap();
    library
        .add_or_edit_user(User::new("U02", "Alan", "Turing", "alan@example.org").unwrap())
        .unwrap();
    library
}

fn book<'a>(library: &'a Library, isbn: &str) -> &'a Book {
    library.books().get(&isbn.to_string()).unwrap()
}

fn user<'a>(library: &'a Library, id: &str) -> &'a User {
    library.users().get(&id.to_string()).unwrap()
}

#[test]
fn lend_and_return_update_counters() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());

    let lending = library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
    assert_eq!(lending.id(), 1);
    assert_eq!(lending.book().copies_lent(), 1);
    assert_eq!(book(&library, DUNE).copies_available(), 1);
    assert_eq!(book(&library, DUNE).times_lent(), 1);
    assert_eq!(user(&library, "U01").borrowed(), 1);

    let returned = library.return_lending(lending.id()).unwrap();
    assert!(returned.is_returned());
    assert_eq!(book(&library, DUNE).copies_available(), 2);
    assert_eq!(book(&library, DUNE).copies_lent(), 0);
    assert_eq!(book(&library, DUNE).times_lent(), 1);
    assert_eq!(user(&library, "U01").borrowed(), 0);

    assert!(matches!(
        library.return_lending(lending.id()),
        Err(CatalogError::AlreadyReturned { id: 1 })
    ));
    assert!(library.return_lending(99).unwrap_err().is_not_found());
}

#[test]
fn lending_without_copies_changes_nothing() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());

    library.lend(EMMA, "U01", date(2025, 3, 1)).unwrap();
    let books_before = fs::read_to_string(dir.path().join("books.db")).unwrap();

    assert!(matches!(
        library.lend(EMMA, "U02", date(2025, 3, 1)),
        Err(CatalogError::NoCopiesAvailable { .. })
    ));
    assert_eq!(user(&library, "U02").borrowed(), 0);
    assert_eq!(library.lendings().len(), 1);
    assert_eq!(library.next_lending_id(), 2);
    assert_eq!(
        fs::read_to_string(dir.path().join("books.db")).unwrap(),
        books_before
    );
}

#[test]
fn lending_unknown_entities_is_not_found() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());

    let err = library.lend("000", "U01", date(2025, 3, 1)).unwrap_err();
    assert!(err.is_not_found());
    let err = library.lend(DUNE, "U99", date(2025, 3, 1)).unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(book(&library, DUNE).copies_available(), 2);
}

#[test]
fn state_survives_reopen() {
    let dir = tempdir().unwrap();
    {
        let mut library = stocked(dir.path());
        library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
        library.lend(DUNE, "U02", date(2025, 3, 8)).unwrap();
        library.return_lending(1).unwrap();
    }

    let mut library = Library::open(LibraryConfig::new(dir.path())).unwrap();

    assert_eq!(library.lendings().len(), 2);
    assert_eq!(library.next_lending_id(), 3);
    assert_eq!(book(&library, DUNE).copies_lent(), 1);
    assert_eq!(user(&library, "U02").borrowed(), 1);

    let open = library.lendings().get(&2).unwrap();
    assert!(!open.is_returned());
    assert_eq!(open.user().id(), "U02");
    assert_eq!(open.return_date(), date(2025, 3, 8));

    let third = library.lend(EMMA, "U01", date(2025, 4, 1)).unwrap();
    assert_eq!(third.id(), 3);
}

#[test]
fn id_sequence_is_seeded_from_store() {
    let dir = tempdir().unwrap();
    {
        let mut library = stocked(dir.path());
        library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
    }
    let lendings = dir.path().join("lendings.db");
    let content = fs::read_to_string(&lendings)
        .unwrap()
        .replacen("1\u{1c}", "41\u{1c}", 1);
    fs::write(&lendings, content).unwrap();

    let library = Library::open(LibraryConfig::new(dir.path())).unwrap();
    assert!(library.lendings().contains(&41));
    assert_eq!(library.next_lending_id(), 42);
}

#[test]
fn skipped_lending_ids_are_not_reused() {
    let dir = tempdir().unwrap();
    drop(stocked(dir.path()));

    fs::write(
        dir.path().join("lendings.db"),
        "7\u{1c}000\u{1c}U01\u{1c}2025-03-01\u{1c}false\nnot a lending\n",
    )
    .unwrap();

    let mut library = Library::open(LibraryConfig::new(dir.path())).unwrap();
    assert!(library.lendings().is_empty());
    assert_eq!(library.next_lending_id(), 8);
    assert_eq!(library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap().id(), 8);
}

#[test]
fn unresolved_lending_lines_are_skipped() {
    let dir = tempdir().unwrap();
    drop(stocked(dir.path()));

    let lendings = dir.path().join("lendings.db");
    fs::write(
        &lendings,
        format!(
            "1\u{1c}{DUNE}\u{1c}U01\u{1c}2025-03-01\u{1c}false\n\
             2\u{1c}000\u{1c}U01\u{1c}2025-03-01\u{1c}false\n\
             3\u{1c}{EMMA}\u{1c}U77\u{1c}2025-03-01\u{1c}false\n"
        ),
    )
    .unwrap();

    let library = Library::open(LibraryConfig::new(dir.path())).unwrap();

    assert_eq!(library.lendings().len(), 1);
    let report = library.lendings().last_rebuild().unwrap();
    let lines: Vec<usize> = report.skipped.iter().map(|s| s.line_no).collect();
    assert_eq!(lines, vec![2, 3]);
    assert!(report.skipped[0].message.contains("unresolved book reference"));
    assert!(report.skipped[1].message.contains("unresolved user reference"));
}

#[test]
fn referenced_entities_cannot_be_removed() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());
    let lending = library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();

    assert!(matches!(
        library.remove_book(DUNE),
        Err(CatalogError::Referenced { kind: "book", lending_id: 1, .. })
    ));
    assert!(matches!(
        library.remove_user("U01"),
        Err(CatalogError::Referenced { kind: "user", .. })
    ));
    assert!(matches!(
        library.remove_lending(lending.id()),
        Err(CatalogError::Core(CoreError::InvalidOperation { .. }))
    ));

    library.return_lending(lending.id()).unwrap();
    library.remove_lending(lending.id()).unwrap();
    library.remove_book(DUNE).unwrap();
    library.remove_user("U01").unwrap();

    assert!(library.books().get(&DUNE.to_string()).is_none());
    assert!(library.remove_user("U01").unwrap_err().is_not_found());
}

#[test]
fn editing_a_book_reindexes_its_lendings() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());
    library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
    let lendings_before = fs::read_to_string(dir.path().join("lendings.db")).unwrap();

    let mut dune = book(&library, DUNE).clone();
    dune.set_title("Dune Messiah").unwrap();
    library.add_or_edit_book(dune).unwrap();

    let hits = library.lendings().search("messiah");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].book().title(), "Dune Messiah");
    assert_eq!(
        fs::read_to_string(dir.path().join("lendings.db")).unwrap(),
        lendings_before
    );
}

#[test]
fn search_spans_projection_fields() {
    let dir = tempdir().unwrap();
    let library = stocked(dir.path());

    let by_author: Vec<&str> = library
        .books()
        .search("austen")
        .iter()
        .map(|b| b.isbn())
        .collect();
    assert_eq!(by_author, vec![EMMA]);

    let by_surname = library.users().search("turing");
    assert_eq!(by_surname[0].id(), "U02");
}

#[test]
fn overdue_lendings() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());
    library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
    library.lend(EMMA, "U02", date(2025, 5, 1)).unwrap();

    let overdue: Vec<u64> = library.overdue(date(2025, 4, 1)).map(|l| l.id()).collect();
    assert_eq!(overdue, vec![1]);
}

#[test]
fn failed_write_is_reverted() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());
    let books_before = fs::read_to_string(dir.path().join("books.db")).unwrap();

    let users_store = library.config().store_path(Collection::Users);
    fs::remove_file(&users_store).unwrap();
    fs::create_dir(&users_store).unwrap();

    assert!(library.lend(DUNE, "U01", date(2025, 3, 1)).is_err());

    assert_eq!(book(&library, DUNE).copies_available(), 2);
    assert_eq!(book(&library, DUNE).times_lent(), 0);
    assert_eq!(
        fs::read_to_string(dir.path().join("books.db")).unwrap(),
        books_before
    );
    assert!(library.lendings().is_empty());
    assert_eq!(library.next_lending_id(), 1);
}

#[test]
fn refresh_follows_external_edits() {
    let dir = tempdir().unwrap();
    let mut library = stocked(dir.path());
    library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
    assert!(!library.refresh().unwrap());

    let extra = Book::new("Ulysses", vec!["James Joyce".into()], "X9", 1922, 1).unwrap();
    let books_path = dir.path().join("books.db");
    let mut content = fs::read_to_string(&books_path).unwrap();
    content.push_str(&extra.encode());
    content.push('\n');
    fs::write(&books_path, content).unwrap();

    assert!(library.refresh().unwrap());
    assert_eq!(library.books().len(), 3);
    assert_eq!(library.lendings().len(), 1);
    assert_eq!(library.books().search("joyce").len(), 1);
}

#[test]
fn non_canonical_book_lines_are_edited_and_removed() {
    let dir = tempdir().unwrap();
    let config = LibraryConfig::new(dir.path());
    let books_path = dir.path().join("books.db");
    let padded_year = "Dune\u{1c}Frank Herbert\u{1c}978\u{1c}01965\u{1c}2\u{1c}0\u{1c}0\n";
    fs::write(&books_path, padded_year).unwrap();

    let mut library = Library::open(config.clone()).unwrap();
    let mut dune = book(&library, "978").clone();
    assert_eq!(dune.year(), 1965);
    dune.set_title("Dune Messiah").unwrap();
    library.add_or_edit_book(dune).unwrap();
    assert_eq!(fs::read_to_string(&books_path).unwrap().lines().count(), 1);

    let library = Library::open_rebuilt(config.clone()).unwrap();
    assert!(library.books().last_rebuild().unwrap().is_clean());
    assert_eq!(book(&library, "978").title(), "Dune Messiah");

    fs::write(&books_path, padded_year).unwrap();
    let mut library = Library::open(config.clone()).unwrap();
    library.remove_book("978").unwrap();
    assert_eq!(fs::read_to_string(&books_path).unwrap().lines().count(), 0);

    assert!(Library::open(config).unwrap().books().is_empty());
}

#[test]
fn lendings_follow_every_book_and_user_write() {
    let dir = tempdir().unwrap();
    let config = LibraryConfig::new(dir.path());
    {
        let mut library = stocked(dir.path());
        library.lend(DUNE, "U01", date(2025, 3, 1)).unwrap();
        library.lend(DUNE, "U02", date(2025, 3, 8)).unwrap();
        library.lend(EMMA, "U01", date(2025, 3, 9)).unwrap();

        let copies_lent: Vec<u32> = library
            .lendings()
            .iter()
            .filter(|l| l.book().isbn() == DUNE)
            .map(|l| l.book().copies_lent())
            .collect();
        assert_eq!(copies_lent, vec![2, 2]);
        assert_eq!(library.lendings().get(&1).unwrap().user().borrowed(), 2);

        library.return_lending(1).unwrap();
        let mut alan = user(&library, "U02").clone();
        alan.set_email("alan@bletchley.uk").unwrap();
        library.add_or_edit_user(alan).unwrap();
    }

    let loaded = Library::open(config.clone()).unwrap();
    assert_eq!(loaded.lendings().state(), SyncState::LoadedFromSnapshot);
    let from_snapshot = loaded.lendings().to_vec();
    let found: Vec<u64> = loaded.lendings().search("bletchley").iter().map(|l| l.id()).collect();
    drop(loaded);

    let rebuilt = Library::open_rebuilt(config).unwrap();
    assert_eq!(rebuilt.lendings().to_vec(), from_snapshot);
    assert_eq!(found, vec![2]);
    assert!(from_snapshot
        .iter()
        .filter(|l| l.book().isbn() == DUNE)
        .all(|l| l.book().copies_lent() == 1));
}
