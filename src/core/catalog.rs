//! Catalog business logic - authors, genres, formats, publishers, books and copies.
//!
//! Every entity follows the same lifecycle: created from a validated draft,
//! updated in place, and archived instead of deleted. Archived rows disappear
//! from the `get_active_*` listings but stay resolvable by id so historical
//! loans keep pointing at real records.

use crate::{
    core::validation::{
        AuthorDraft, BookCopyDraft, BookDraft, FormatDraft, GenreDraft, PublisherDraft, Validate,
    },
    entities::{
        Author, Book, BookCopy, Format, Genre, Publisher, author, book, book_copy, format, genre,
        publisher,
    },
    errors::{Error, Result},
};
use sea_orm::{PrimaryKeyTrait, QueryOrder, Set, prelude::*};
use tracing::info;

/// Looks up a row by id and rejects it if missing or archived.
async fn find_active<E, C>(
    db: &C,
    id: i64,
    entity: &'static str,
    is_archived: fn(&E::Model) -> bool,
) -> Result<E::Model>
where
    E: EntityTrait,
    C: ConnectionTrait,
    <E::PrimaryKey as PrimaryKeyTrait>::ValueType: From<i64>,
{
    E::find_by_id(id)
        .one(db)
        .await?
        .filter(|model| !is_archived(model))
        .ok_or(Error::NotFound { entity, id })
}

// ---------------------------------------------------------------- authors

/// Retrieves all active authors ordered by last then first name.
pub async fn get_active_authors(db: &DatabaseConnection) -> Result<Vec<author::Model>> {
    Author::find()
        .filter(author::Column::IsArchived.eq(false))
        .order_by_asc(author::Column::LastName)
        .order_by_asc(author::Column::FirstName)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an author by id, archived or not.
pub async fn get_author_by_id(
    db: &DatabaseConnection,
    author_id: i64,
) -> Result<Option<author::Model>> {
    Author::find_by_id(author_id).one(db).await.map_err(Into::into)
}

/// Creates a new author from a validated draft.
pub async fn create_author<C: ConnectionTrait>(
    db: &C,
    draft: AuthorDraft,
) -> Result<author::Model> {
    draft.ensure_valid()?;
    let author = author::ActiveModel {
        first_name: Set(draft.first_name.trim().to_string()),
        last_name: Set(draft.last_name.trim().to_string()),
        is_archived: Set(false),
        ..Default::default()
    };
    author.insert(db).await.map_err(Into::into)
}

/// Replaces an active author's names.
pub async fn update_author(
    db: &DatabaseConnection,
    author_id: i64,
    draft: AuthorDraft,
) -> Result<author::Model> {
    draft.ensure_valid()?;
    let mut author: author::ActiveModel =
        find_active::<Author, _>(db, author_id, "Author", |a| a.is_archived)
            .await?
            .into();
    author.first_name = Set(draft.first_name.trim().to_string());
    author.last_name = Set(draft.last_name.trim().to_string());
    author.update(db).await.map_err(Into::into)
}

/// Soft deletes an author.
///
/// # Errors
/// Returns an error if the author does not exist or is already archived.
pub async fn archive_author(db: &DatabaseConnection, author_id: i64) -> Result<author::Model> {
    let mut author: author::ActiveModel =
        find_active::<Author, _>(db, author_id, "Author", |a| a.is_archived)
            .await?
            .into();
    author.is_archived = Set(true);
    let result = author.update(db).await?;
    info!(author_id, "Archived author");
    Ok(result)
}

// ----------------------------------------------------------------- genres

/// Retrieves all active genres ordered by name.
pub async fn get_active_genres(db: &DatabaseConnection) -> Result<Vec<genre::Model>> {
    Genre::find()
        .filter(genre::Column::IsArchived.eq(false))
        .order_by_asc(genre::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_genre_by_id(
    db: &DatabaseConnection,
    genre_id: i64,
) -> Result<Option<genre::Model>> {
    Genre::find_by_id(genre_id).one(db).await.map_err(Into::into)
}

/// Creates a new genre from a validated draft.
pub async fn create_genre<C: ConnectionTrait>(db: &C, draft: GenreDraft) -> Result<genre::Model> {
    draft.ensure_valid()?;
    let genre = genre::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        is_archived: Set(false),
        ..Default::default()
    };
    genre.insert(db).await.map_err(Into::into)
}

pub async fn update_genre(
    db: &DatabaseConnection,
    genre_id: i64,
    draft: GenreDraft,
) -> Result<genre::Model> {
    draft.ensure_valid()?;
    let mut genre: genre::ActiveModel =
        find_active::<Genre, _>(db, genre_id, "Genre", |g| g.is_archived)
            .await?
            .into();
    genre.name = Set(draft.name.trim().to_string());
    genre.update(db).await.map_err(Into::into)
}

/// Soft deletes a genre. Books in the genre keep their reference.
pub async fn archive_genre(db: &DatabaseConnection, genre_id: i64) -> Result<genre::Model> {
    let mut genre: genre::ActiveModel =
        find_active::<Genre, _>(db, genre_id, "Genre", |g| g.is_archived)
            .await?
            .into();
    genre.is_archived = Set(true);
    let result = genre.update(db).await?;
    info!(genre_id, "Archived genre");
    Ok(result)
}

// ---------------------------------------------------------------- formats

/// Retrieves all active formats ordered by type name.
pub async fn get_active_formats(db: &DatabaseConnection) -> Result<Vec<format::Model>> {
    Format::find()
        .filter(format::Column::IsArchived.eq(false))
        .order_by_asc(format::Column::Kind)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_format_by_id(
    db: &DatabaseConnection,
    format_id: i64,
) -> Result<Option<format::Model>> {
    Format::find_by_id(format_id).one(db).await.map_err(Into::into)
}

pub async fn create_format<C: ConnectionTrait>(
    db: &C,
    draft: FormatDraft,
) -> Result<format::Model> {
    draft.ensure_valid()?;
    let format = format::ActiveModel {
        kind: Set(draft.kind.trim().to_string()),
        is_archived: Set(false),
        ..Default::default()
    };
    format.insert(db).await.map_err(Into::into)
}

pub async fn update_format(
    db: &DatabaseConnection,
    format_id: i64,
    draft: FormatDraft,
) -> Result<format::Model> {
    draft.ensure_valid()?;
    let mut format: format::ActiveModel =
        find_active::<Format, _>(db, format_id, "Format", |f| f.is_archived)
            .await?
            .into();
    format.kind = Set(draft.kind.trim().to_string());
    format.update(db).await.map_err(Into::into)
}

pub async fn archive_format(db: &DatabaseConnection, format_id: i64) -> Result<format::Model> {
    let mut format: format::ActiveModel =
        find_active::<Format, _>(db, format_id, "Format", |f| f.is_archived)
            .await?
            .into();
    format.is_archived = Set(true);
    let result = format.update(db).await?;
    info!(format_id, "Archived format");
    Ok(result)
}

// ------------------------------------------------------------- publishers

/// Retrieves all active publishers ordered by name.
pub async fn get_active_publishers(db: &DatabaseConnection) -> Result<Vec<publisher::Model>> {
    Publisher::find()
        .filter(publisher::Column::IsArchived.eq(false))
        .order_by_asc(publisher::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

pub async fn get_publisher_by_id(
    db: &DatabaseConnection,
    publisher_id: i64,
) -> Result<Option<publisher::Model>> {
    Publisher::find_by_id(publisher_id)
        .one(db)
        .await
        .map_err(Into::into)
}

pub async fn create_publisher<C: ConnectionTrait>(
    db: &C,
    draft: PublisherDraft,
) -> Result<publisher::Model> {
    draft.ensure_valid()?;
    let publisher = publisher::ActiveModel {
        name: Set(draft.name.trim().to_string()),
        location: Set(draft.location.map(|l| l.trim().to_string())),
        is_archived: Set(false),
        ..Default::default()
    };
    publisher.insert(db).await.map_err(Into::into)
}

pub async fn update_publisher(
    db: &DatabaseConnection,
    publisher_id: i64,
    draft: PublisherDraft,
) -> Result<publisher::Model> {
    draft.ensure_valid()?;
    let mut publisher: publisher::ActiveModel =
        find_active::<Publisher, _>(db, publisher_id, "Publisher", |p| p.is_archived)
            .await?
            .into();
    publisher.name = Set(draft.name.trim().to_string());
    publisher.location = Set(draft.location.map(|l| l.trim().to_string()));
    publisher.update(db).await.map_err(Into::into)
}

/// Soft deletes a publisher. Doesn't touch copies issued by it.
pub async fn archive_publisher(
    db: &DatabaseConnection,
    publisher_id: i64,
) -> Result<publisher::Model> {
    let mut publisher: publisher::ActiveModel =
        find_active::<Publisher, _>(db, publisher_id, "Publisher", |p| p.is_archived)
            .await?
            .into();
    publisher.is_archived = Set(true);
    let result = publisher.update(db).await?;
    info!(publisher_id, "Archived publisher");
    Ok(result)
}

// ------------------------------------------------------------------ books

/// Retrieves all active books ordered by title.
pub async fn get_active_books(db: &DatabaseConnection) -> Result<Vec<book::Model>> {
    Book::find()
        .filter(book::Column::IsArchived.eq(false))
        .order_by_asc(book::Column::Title)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a book by id, archived or not.
pub async fn get_book_by_id(db: &DatabaseConnection, book_id: i64) -> Result<Option<book::Model>> {
    Book::find_by_id(book_id).one(db).await.map_err(Into::into)
}

async fn ensure_book_references<C: ConnectionTrait>(db: &C, draft: &BookDraft) -> Result<()> {
    find_active::<Author, _>(db, draft.author_id, "Author", |a| a.is_archived).await?;
    find_active::<Genre, _>(db, draft.genre_id, "Genre", |g| g.is_archived).await?;
    Ok(())
}

/// Creates a new book from a validated draft.
///
/// # Errors
/// Returns an error if:
/// - The title is blank or the ISBN is not 13 characters
/// - The author or genre does not exist or is archived
/// - The database insert fails
pub async fn create_book<C: ConnectionTrait>(db: &C, draft: BookDraft) -> Result<book::Model> {
    draft.ensure_valid()?;
    ensure_book_references(db, &draft).await?;

    let book = book::ActiveModel {
        title: Set(draft.title.trim().to_string()),
        isbn: Set(draft.isbn),
        author_id: Set(draft.author_id),
        genre_id: Set(draft.genre_id),
        is_archived: Set(false),
        ..Default::default()
    };
    let result = book.insert(db).await?;
    info!(book_id = result.id, "Created book {}", result.title);
    Ok(result)
}

pub async fn update_book(
    db: &DatabaseConnection,
    book_id: i64,
    draft: BookDraft,
) -> Result<book::Model> {
    draft.ensure_valid()?;
    ensure_book_references(db, &draft).await?;

    let mut book: book::ActiveModel = find_active::<Book, _>(db, book_id, "Book", |b| b.is_archived)
        .await?
        .into();
    book.title = Set(draft.title.trim().to_string());
    book.isbn = Set(draft.isbn);
    book.author_id = Set(draft.author_id);
    book.genre_id = Set(draft.genre_id);
    book.update(db).await.map_err(Into::into)
}

/// Soft deletes a book. Its copies and their loans are left untouched.
pub async fn archive_book(db: &DatabaseConnection, book_id: i64) -> Result<book::Model> {
    let mut book: book::ActiveModel = find_active::<Book, _>(db, book_id, "Book", |b| b.is_archived)
        .await?
        .into();
    book.is_archived = Set(true);
    let result = book.update(db).await?;
    info!(book_id, "Archived book");
    Ok(result)
}

// ----------------------------------------------------------------- copies

/// Finds a copy by id, archived or not.
pub async fn get_copy_by_id<C: ConnectionTrait>(
    db: &C,
    copy_id: i64,
) -> Result<Option<book_copy::Model>> {
    BookCopy::find_by_id(copy_id).one(db).await.map_err(Into::into)
}

/// Retrieves the active copies of a book.
pub async fn get_copies_for_book(
    db: &DatabaseConnection,
    book_id: i64,
) -> Result<Vec<book_copy::Model>> {
    BookCopy::find()
        .filter(book_copy::Column::BookId.eq(book_id))
        .filter(book_copy::Column::IsArchived.eq(false))
        .order_by_asc(book_copy::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the active copies of a book that can be checked out right now.
pub async fn get_available_copies_for_book(
    db: &DatabaseConnection,
    book_id: i64,
) -> Result<Vec<book_copy::Model>> {
    BookCopy::find()
        .filter(book_copy::Column::BookId.eq(book_id))
        .filter(book_copy::Column::IsArchived.eq(false))
        .filter(book_copy::Column::IsAvailable.eq(true))
        .order_by_asc(book_copy::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

async fn ensure_copy_references<C: ConnectionTrait>(db: &C, draft: &BookCopyDraft) -> Result<()> {
    find_active::<Book, _>(db, draft.book_id, "Book", |b| b.is_archived).await?;
    find_active::<Format, _>(db, draft.format_id, "Format", |f| f.is_archived).await?;
    find_active::<Publisher, _>(db, draft.publisher_id, "Publisher", |p| p.is_archived).await?;
    Ok(())
}

/// Adds a new, available copy of a book.
pub async fn create_copy<C: ConnectionTrait>(
    db: &C,
    draft: BookCopyDraft,
) -> Result<book_copy::Model> {
    draft.ensure_valid()?;
    ensure_copy_references(db, &draft).await?;

    let copy = book_copy::ActiveModel {
        book_id: Set(draft.book_id),
        format_id: Set(draft.format_id),
        publisher_id: Set(draft.publisher_id),
        copyright_year: Set(draft.copyright_year),
        number_of_pages: Set(draft.number_of_pages),
        shelf_number: Set(draft.shelf_number),
        is_available: Set(true),
        is_archived: Set(false),
        ..Default::default()
    };
    copy.insert(db).await.map_err(Into::into)
}

/// Updates a copy's descriptive fields. Availability is owned by lending and
/// is never changed here.
pub async fn update_copy(
    db: &DatabaseConnection,
    copy_id: i64,
    draft: BookCopyDraft,
) -> Result<book_copy::Model> {
    draft.ensure_valid()?;
    ensure_copy_references(db, &draft).await?;

    let mut copy: book_copy::ActiveModel =
        find_active::<BookCopy, _>(db, copy_id, "Copy", |c| c.is_archived)
            .await?
            .into();
    copy.book_id = Set(draft.book_id);
    copy.format_id = Set(draft.format_id);
    copy.publisher_id = Set(draft.publisher_id);
    copy.copyright_year = Set(draft.copyright_year);
    copy.number_of_pages = Set(draft.number_of_pages);
    copy.shelf_number = Set(draft.shelf_number);
    copy.update(db).await.map_err(Into::into)
}

pub async fn archive_copy(db: &DatabaseConnection, copy_id: i64) -> Result<book_copy::Model> {
    let mut copy: book_copy::ActiveModel =
        find_active::<BookCopy, _>(db, copy_id, "Copy", |c| c.is_archived)
            .await?
            .into();
    copy.is_archived = Set(true);
    let result = copy.update(db).await?;
    info!(copy_id, "Archived copy");
    Ok(result)
}
