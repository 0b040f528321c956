//! Shared test utilities for the library system.
//!
//! This module provides common helper functions for setting up test databases
//! and creating catalog and account fixtures with sensible defaults.

use crate::{
    core::{
        catalog, members,
        validation::{
            AuthorDraft, BookCopyDraft, BookDraft, FormatDraft, GenreDraft, MemberDraft,
            PublisherDraft,
        },
    },
    entities,
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a calendar date, panicking on an impossible one.
#[allow(clippy::unwrap_used)]
pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

/// Registers a member with the given credentials.
///
/// # Defaults
/// * `first_name`: "Test"
/// * `last_name`: "Member"
pub async fn create_test_member(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<entities::member::Model> {
    members::register_member(
        db,
        MemberDraft {
            first_name: "Test".to_string(),
            last_name: "Member".to_string(),
            username: username.to_string(),
            password: password.to_string(),
        },
    )
    .await
}

/// Creates an administrator with the given credentials.
pub async fn create_test_administrator(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<entities::administrator::Model> {
    members::create_administrator(db, username, password).await
}

pub async fn create_test_author(
    db: &DatabaseConnection,
    first_name: &str,
    last_name: &str,
) -> Result<entities::author::Model> {
    catalog::create_author(
        db,
        AuthorDraft {
            first_name: first_name.to_string(),
            last_name: last_name.to_string(),
        },
    )
    .await
}

pub async fn create_test_genre(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::genre::Model> {
    catalog::create_genre(
        db,
        GenreDraft {
            name: name.to_string(),
        },
    )
    .await
}

pub async fn create_test_format(
    db: &DatabaseConnection,
    kind: &str,
) -> Result<entities::format::Model> {
    catalog::create_format(
        db,
        FormatDraft {
            kind: kind.to_string(),
        },
    )
    .await
}

/// Creates a publisher with no location.
pub async fn create_test_publisher(
    db: &DatabaseConnection,
    name: &str,
) -> Result<entities::publisher::Model> {
    catalog::create_publisher(
        db,
        PublisherDraft {
            name: name.to_string(),
            location: None,
        },
    )
    .await
}

/// Creates a book with a fixed, valid ISBN.
pub async fn create_test_book(
    db: &DatabaseConnection,
    title: &str,
    author_id: i64,
    genre_id: i64,
) -> Result<entities::book::Model> {
    catalog::create_book(
        db,
        BookDraft {
            title: title.to_string(),
            isbn: "9780060935467".to_string(),
            author_id,
            genre_id,
        },
    )
    .await
}

/// A database with one active row of every catalog entity.
pub struct CatalogFixture {
    pub db: DatabaseConnection,
    pub author: entities::author::Model,
    pub genre: entities::genre::Model,
    pub format: entities::format::Model,
    pub publisher: entities::publisher::Model,
    pub book: entities::book::Model,
}

/// Sets up a complete catalog without any copies.
pub async fn setup_catalog() -> Result<CatalogFixture> {
    let db = setup_test_db().await?;
    let author = create_test_author(&db, "Harper", "Lee").await?;
    let genre = create_test_genre(&db, "Classic").await?;
    let format = create_test_format(&db, "Hardcover").await?;
    let publisher = create_test_publisher(&db, "HarperCollins").await?;
    let book = create_test_book(&db, "To Kill a Mockingbird", author.id, genre.id).await?;
    Ok(CatalogFixture {
        db,
        author,
        genre,
        format,
        publisher,
        book,
    })
}

/// A valid copy draft for the fixture's book.
///
/// # Defaults
/// * `copyright_year`: 1960
/// * `number_of_pages`: 281
/// * `shelf_number`: "A1"
pub fn test_copy_draft(fixture: &CatalogFixture) -> BookCopyDraft {
    BookCopyDraft {
        book_id: fixture.book.id,
        format_id: fixture.format.id,
        publisher_id: fixture.publisher.id,
        copyright_year: 1960,
        number_of_pages: Some(281),
        shelf_number: Some("A1".to_string()),
    }
}

/// Adds an available copy of the fixture's book.
pub async fn create_test_copy(
    db: &DatabaseConnection,
    fixture: &CatalogFixture,
) -> Result<entities::book_copy::Model> {
    catalog::create_copy(db, test_copy_draft(fixture)).await
}
