//! The browsable book list shared by both consoles.
//!
//! Rows are the active books joined with their author, genre and the formats
//! their active copies come in. Filtering and searching narrow the visible
//! rows without touching the cache; `clear` shows every active book again.

use super::{Listing, SortBy};
use crate::{
    entities::{Author, Book, BookCopy, Genre, author, book, book_copy, format, genre},
    errors::Result,
    events::{EntityKind, LibraryEvent},
};
use sea_orm::{DatabaseConnection, prelude::*};
use std::{
    cmp::Ordering,
    collections::{BTreeSet, HashMap},
};

/// Name of the placeholder genre or format that means "any".
const ANY: &str = "None";

/// One active book as shown in a listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookRow {
    pub book: book::Model,
    pub author: author::Model,
    pub genre: genre::Model,
    /// Formats of the book's active copies
    pub format_ids: BTreeSet<i64>,
}

impl BookRow {
    fn matches_text(&self, needle: &str) -> bool {
        self.book.title.to_lowercase().contains(needle)
            || self.author.display_name().to_lowercase().contains(needle)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookColumn {
    Title,
    Author,
    Genre,
    Isbn,
}

impl SortBy<BookColumn> for BookRow {
    fn compare(&self, other: &Self, column: BookColumn) -> Ordering {
        match column {
            BookColumn::Title => self.book.title.cmp(&other.book.title),
            BookColumn::Author => self
                .author
                .display_name()
                .cmp(&other.author.display_name()),
            BookColumn::Genre => self.genre.name.cmp(&other.genre.name),
            BookColumn::Isbn => self.book.isbn.cmp(&other.book.isbn),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
struct Criteria {
    format_id: Option<i64>,
    genre_id: Option<i64>,
    /// Lowercased search text
    text: Option<String>,
}

impl Criteria {
    fn accepts(&self, row: &BookRow) -> bool {
        self.format_id.is_none_or(|id| row.format_ids.contains(&id))
            && self.genre_id.is_none_or(|id| row.book.genre_id == id)
            && self.text.as_deref().is_none_or(|text| row.matches_text(text))
    }
}

/// Paged, sortable, filterable list of active books.
#[derive(Debug, Clone)]
pub struct BookListing {
    cache: Vec<BookRow>,
    criteria: Criteria,
    listing: Listing<BookRow, BookColumn>,
}

impl BookListing {
    /// Builds a listing over already loaded rows, sorted by title.
    #[must_use]
    pub fn from_rows(rows: Vec<BookRow>, page_size: usize) -> Self {
        Self {
            listing: Listing::new(rows.clone(), page_size, BookColumn::Title),
            cache: rows,
            criteria: Criteria::default(),
        }
    }

    /// Loads every active book with its author, genre and copy formats.
    pub async fn load(db: &DatabaseConnection, page_size: usize) -> Result<Self> {
        Ok(Self::from_rows(load_rows(db, None).await?, page_size))
    }

    /// The underlying listing, for paging and sorting.
    #[must_use]
    pub const fn listing(&self) -> &Listing<BookRow, BookColumn> {
        &self.listing
    }

    pub fn listing_mut(&mut self) -> &mut Listing<BookRow, BookColumn> {
        &mut self.listing
    }

    /// Rows on the current page.
    #[must_use]
    pub fn visible(&self) -> &[BookRow] {
        self.listing.visible()
    }

    /// Restricts the list to books having a copy in `format` and belonging to
    /// `genre`. A missing value, or one named "None", places no constraint.
    pub fn filter(&mut self, format: Option<&format::Model>, genre: Option<&genre::Model>) {
        self.criteria.format_id = format.filter(|f| f.kind != ANY).map(|f| f.id);
        self.criteria.genre_id = genre.filter(|g| g.name != ANY).map(|g| g.id);
        self.rebuild();
    }

    /// Restricts the list to books whose title or "Last, First" author name
    /// contains `text`, ignoring case. Blank text places no constraint.
    pub fn search(&mut self, text: &str) {
        let text = text.trim();
        self.criteria.text = (!text.is_empty()).then(|| text.to_lowercase());
        self.rebuild();
    }

    /// Drops the filter and the search.
    pub fn clear(&mut self) {
        self.criteria = Criteria::default();
        self.rebuild();
    }

    /// Patches the cache for a committed change.
    ///
    /// Book and copy changes reload the affected row; author and genre edits
    /// reload every row that shows them.
    pub async fn apply(&mut self, db: &DatabaseConnection, event: &LibraryEvent) -> Result<()> {
        let Some((kind, id)) = event.record() else {
            return Ok(());
        };

        let book_ids: Vec<i64> = match kind {
            EntityKind::Book => vec![id],
            EntityKind::Copy => match BookCopy::find_by_id(id).one(db).await? {
                Some(copy) => vec![copy.book_id],
                None => Vec::new(),
            },
            EntityKind::Author => self
                .cache
                .iter()
                .filter(|row| row.author.id == id)
                .map(|row| row.book.id)
                .collect(),
            EntityKind::Genre => self
                .cache
                .iter()
                .filter(|row| row.genre.id == id)
                .map(|row| row.book.id)
                .collect(),
            EntityKind::Format | EntityKind::Publisher | EntityKind::Member => Vec::new(),
        };
        if book_ids.is_empty() {
            return Ok(());
        }

        let fresh = load_rows(db, Some(&book_ids)).await?;
        self.cache.retain(|row| !book_ids.contains(&row.book.id));
        self.cache.extend(fresh);
        self.rebuild();
        Ok(())
    }

    fn rebuild(&mut self) {
        let rows = self
            .cache
            .iter()
            .filter(|row| self.criteria.accepts(row))
            .cloned()
            .collect();
        self.listing.replace_all(rows);
    }
}

/// Loads active book rows, optionally restricted to `book_ids`.
async fn load_rows(db: &DatabaseConnection, book_ids: Option<&[i64]>) -> Result<Vec<BookRow>> {
    let mut query = Book::find().filter(book::Column::IsArchived.eq(false));
    if let Some(ids) = book_ids {
        query = query.filter(book::Column::Id.is_in(ids.iter().copied()));
    }
    let books = query.all(db).await?;
    if books.is_empty() {
        return Ok(Vec::new());
    }

    let authors: HashMap<i64, author::Model> = Author::find()
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a))
        .collect();
    let genres: HashMap<i64, genre::Model> = Genre::find()
        .all(db)
        .await?
        .into_iter()
        .map(|g| (g.id, g))
        .collect();

    let mut formats: HashMap<i64, BTreeSet<i64>> = HashMap::new();
    for copy in BookCopy::find()
        .filter(book_copy::Column::IsArchived.eq(false))
        .filter(book_copy::Column::BookId.is_in(books.iter().map(|b| b.id)))
        .all(db)
        .await?
    {
        formats.entry(copy.book_id).or_default().insert(copy.format_id);
    }

    // A book whose author or genre row is missing cannot be displayed
    Ok(books
        .into_iter()
        .filter_map(|book| {
            let author = authors.get(&book.author_id)?.clone();
            let genre = genres.get(&book.genre_id)?.clone();
            let format_ids = formats.remove(&book.id).unwrap_or_default();
            Some(BookRow {
                book,
                author,
                genre,
                format_ids,
            })
        })
        .collect())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::catalog::{archive_book, create_copy};
    use crate::test_utils::*;
    use rstest::rstest;

    fn row(id: i64, title: &str, last_name: &str, genre_id: i64, formats: &[i64]) -> BookRow {
        BookRow {
            book: book::Model {
                id,
                title: title.to_string(),
                isbn: format!("{id:013}"),
                is_archived: false,
                author_id: id,
                genre_id,
            },
            author: author::Model {
                id,
                first_name: "A.".to_string(),
                last_name: last_name.to_string(),
                is_archived: false,
            },
            genre: genre::Model {
                id: genre_id,
                name: format!("Genre {genre_id}"),
                is_archived: false,
            },
            format_ids: formats.iter().copied().collect(),
        }
    }

    fn sample() -> BookListing {
        BookListing::from_rows(
            vec![
                row(1, "Slaughterhouse Five", "Vonnegut", 1, &[1, 2]),
                row(2, "Bel Canto", "Patchett", 2, &[2]),
                row(3, "The Goldfinch", "Tartt", 2, &[1]),
                row(4, "Me Talk Pretty One Day", "Sedaris", 3, &[]),
            ],
            10,
        )
    }

    fn format_model(id: i64, kind: &str) -> format::Model {
        format::Model {
            id,
            kind: kind.to_string(),
            is_archived: false,
        }
    }

    fn genre_model(id: i64, name: &str) -> genre::Model {
        genre::Model {
            id,
            name: name.to_string(),
            is_archived: false,
        }
    }

    fn titles(listing: &BookListing) -> Vec<&str> {
        listing
            .visible()
            .iter()
            .map(|row| row.book.title.as_str())
            .collect()
    }

    #[test]
    fn sorted_by_title_initially() {
        assert_eq!(
            titles(&sample()),
            vec![
                "Bel Canto",
                "Me Talk Pretty One Day",
                "Slaughterhouse Five",
                "The Goldfinch"
            ]
        );
    }

    #[rstest]
    #[case::format_only(Some(format_model(1, "Paperback")), None, vec!["Slaughterhouse Five", "The Goldfinch"])]
    #[case::genre_only(None, Some(genre_model(2, "Fiction")), vec!["Bel Canto", "The Goldfinch"])]
    #[case::both(Some(format_model(2, "Hardcover")), Some(genre_model(2, "Fiction")), vec!["Bel Canto"])]
    #[case::none_named_format(Some(format_model(9, "None")), Some(genre_model(3, "Humor")), vec!["Me Talk Pretty One Day"])]
    #[case::nothing(None, None, vec!["Bel Canto", "Me Talk Pretty One Day", "Slaughterhouse Five", "The Goldfinch"])]
    fn filter_by_format_and_genre(
        #[case] format: Option<format::Model>,
        #[case] genre: Option<genre::Model>,
        #[case] expected: Vec<&str>,
    ) {
        let mut listing = sample();
        listing.filter(format.as_ref(), genre.as_ref());
        assert_eq!(titles(&listing), expected);
    }

    #[rstest]
    #[case::title_case_insensitive("GOLD", vec!["The Goldfinch"])]
    #[case::author_last_first("tartt, a", vec!["The Goldfinch"])]
    #[case::shared_substring("e", vec!["Bel Canto", "Me Talk Pretty One Day", "Slaughterhouse Five", "The Goldfinch"])]
    #[case::blank("   ", vec!["Bel Canto", "Me Talk Pretty One Day", "Slaughterhouse Five", "The Goldfinch"])]
    #[case::no_match("zzz", vec![])]
    fn search_title_or_author(#[case] text: &str, #[case] expected: Vec<&str>) {
        let mut listing = sample();
        listing.search(text);
        assert_eq!(titles(&listing), expected);
    }

    #[test]
    fn clear_restores_every_book() {
        let mut listing = sample();
        listing.filter(None, Some(&genre_model(2, "Fiction")));
        listing.search("bel");
        assert_eq!(titles(&listing), vec!["Bel Canto"]);

        listing.clear();
        assert_eq!(listing.listing().len(), 4);
    }

    #[test]
    fn sort_by_author_descending() {
        let mut listing = sample();
        listing.listing_mut().sort_by(BookColumn::Author);
        listing.listing_mut().sort_by(BookColumn::Author);
        assert_eq!(listing.visible()[0].author.last_name, "Vonnegut");
    }

    #[tokio::test]
    async fn load_and_apply_events() -> Result<()> {
        let fixture = setup_catalog().await?;
        create_test_copy(&fixture.db, &fixture).await?;

        let mut listing = BookListing::load(&fixture.db, 10).await?;
        assert_eq!(listing.visible().len(), 1);
        assert!(listing.visible()[0].format_ids.contains(&fixture.format.id));

        // A new book appears once its event is applied
        let added = create_test_book(
            &fixture.db,
            "Go Set a Watchman",
            fixture.author.id,
            fixture.genre.id,
        )
        .await?;
        listing
            .apply(
                &fixture.db,
                &LibraryEvent::Added {
                    kind: EntityKind::Book,
                    id: added.id,
                },
            )
            .await?;
        assert_eq!(listing.listing().len(), 2);

        // A new copy updates the book's formats
        let audio = create_test_format(&fixture.db, "Audiobook CD").await?;
        let mut draft = test_copy_draft(&fixture);
        draft.book_id = added.id;
        draft.format_id = audio.id;
        let copy = create_copy(&fixture.db, draft).await?;
        listing
            .apply(
                &fixture.db,
                &LibraryEvent::Added {
                    kind: EntityKind::Copy,
                    id: copy.id,
                },
            )
            .await?;
        listing.filter(Some(&audio), None);
        assert_eq!(titles(&listing), vec!["Go Set a Watchman"]);

        // Archiving removes it again
        listing.clear();
        archive_book(&fixture.db, added.id).await?;
        listing
            .apply(
                &fixture.db,
                &LibraryEvent::Archived {
                    kind: EntityKind::Book,
                    id: added.id,
                },
            )
            .await?;
        assert_eq!(titles(&listing), vec!["To Kill a Mockingbird"]);
        Ok(())
    }
}
