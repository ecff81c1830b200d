//! A small book catalog used throughout the indexer tests.
//!
//! Every book has an author, a publisher and a subject. Several books share each of
//! them, which makes the catalog convenient for exercising buckets that grow, shrink
//! and move between generations.

use std::sync::Arc;

use memodex_index::{FieldValue, Record};
use serde::Serialize;

pub const AUTHOR_ID: &str = "authorId";
pub const PUBLISHER_ID: &str = "publisherId";
pub const SUBJECT_ID: &str = "subjectId";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub title: &'static str,
    pub author_id: i64,
    pub publisher_id: i64,
    pub subject_id: i64,
}

impl Book {
    pub const fn new(
        title: &'static str,
        author_id: i64,
        publisher_id: i64,
        subject_id: i64,
    ) -> Book {
        Book {
            title,
            author_id,
            publisher_id,
            subject_id,
        }
    }
}

impl Record for Book {
    fn value(&self, field: &str) -> FieldValue {
        match field {
            AUTHOR_ID => self.author_id.into(),
            PUBLISHER_ID => self.publisher_id.into(),
            SUBJECT_ID => self.subject_id.into(),
            "title" => self.title.into(),
            _ => FieldValue::Missing,
        }
    }
}

pub const WAR_OF_THE_WORLDS: Book = Book::new("The War of the Worlds", 1, 1, 1);
pub const OF_MICE_AND_MEN: Book = Book::new("Of Mice and Men", 2, 1, 2);
pub const THE_TIME_MACHINE: Book = Book::new("The Time Machine", 1, 2, 1);
pub const LITTLE_WOMEN: Book = Book::new("Little Women", 3, 3, 2);
pub const THE_SCARLET_LETTER: Book = Book::new("The Scarlet Letter", 4, 2, 3);
pub const THE_GREAT_GATSBY: Book = Book::new("The Great Gatsby", 5, 3, 3);
pub const HUCKLEBERRY_FINN: Book = Book::new("Adventures of Huckleberry Finn", 6, 2, 2);
pub const TOM_SAWYER: Book = Book::new("The Adventures of Tom Sawyer", 6, 3, 2);
pub const LORD_OF_THE_FLIES: Book = Book::new("Lord of the Flies", 7, 4, 3);
pub const THE_INVISIBLE_MAN: Book = Book::new("The Invisible Man", 1, 2, 1);
pub const FREE_FALL: Book = Book::new("Free Fall", 7, 2, 3);

/// The ten catalog books, in catalog order, each behind its own `Arc`.
///
/// Every call allocates fresh `Arc`s; tests that compare generations must keep
/// reusing the same vector's elements.
pub fn catalog() -> Vec<Arc<Book>> {
    [
        WAR_OF_THE_WORLDS,
        OF_MICE_AND_MEN,
        THE_TIME_MACHINE,
        LITTLE_WOMEN,
        THE_SCARLET_LETTER,
        THE_GREAT_GATSBY,
        HUCKLEBERRY_FINN,
        TOM_SAWYER,
        LORD_OF_THE_FLIES,
        THE_INVISIBLE_MAN,
    ]
    .into_iter()
    .map(Arc::new)
    .collect()
}

/// Returns the catalog element with the given title.
///
/// Panics if the title is not in `books`.
pub fn find(books: &[Arc<Book>], title: &str) -> Arc<Book> {
    books
        .iter()
        .find(|book| book.title == title)
        .cloned()
        .unwrap_or_else(|| panic!("no book titled '{title}'"))
}

/// Serializes `books` as a JSON array of objects with camel-cased field names.
pub fn books_json(books: &[Arc<Book>]) -> String {
    let books = books.iter().map(Arc::as_ref).collect::<Vec<_>>();
    serde_json::to_string_pretty(&books).expect("books serialize")
}
