//! The librarian's console: catalog maintenance, members, returns and reports.

use super::LibraryContext;
use crate::{
    core::{
        catalog, lending,
        lending::Loan,
        members, report,
        report::{CheckoutCount, OverdueCopy},
        validation::{
            AuthorDraft, BookCopyDraft, BookDraft, FormatDraft, GenreDraft, MemberDraft,
            PublisherDraft,
        },
    },
    entities::{
        administrator, author, book, book_copy, format, genre, member, publisher,
        transaction_detail,
    },
    errors::Result,
    events::{EntityKind, LibraryEvent},
    listing::{
        AuthorColumn, BookListing, CopyColumn, FormatColumn, GenreColumn, Listing, LoanColumn,
        MemberColumn, PublisherColumn, SortBy, TransactionColumn, TransactionRow,
    },
};
use tracing::info;

/// Operations available to a logged-in administrator.
#[derive(Debug, Clone)]
pub struct AdminConsole {
    ctx: LibraryContext,
    account: administrator::Model,
}

impl AdminConsole {
    pub(super) const fn new(ctx: LibraryContext, account: administrator::Model) -> Self {
        Self { ctx, account }
    }

    #[must_use]
    pub const fn account(&self) -> &administrator::Model {
        &self.account
    }

    #[must_use]
    pub const fn context(&self) -> &LibraryContext {
        &self.ctx
    }

    fn added(&self, kind: EntityKind, id: i64) {
        self.ctx.announce(LibraryEvent::Added { kind, id });
    }

    fn updated(&self, kind: EntityKind, id: i64) {
        self.ctx.announce(LibraryEvent::Updated { kind, id });
    }

    fn listing<T: SortBy<C>, C: Copy + PartialEq>(&self, rows: Vec<T>, column: C) -> Listing<T, C> {
        Listing::new(rows, self.ctx.settings.page_size, column)
    }

    fn archived(&self, kind: EntityKind, id: i64) {
        info!(admin = %self.account.username, ?kind, id, "Archived record");
        self.ctx.announce(LibraryEvent::Archived { kind, id });
    }

    // Authors

    /// Active authors, by last name.
    pub async fn authors(&self) -> Result<Listing<author::Model, AuthorColumn>> {
        let rows = catalog::get_active_authors(&self.ctx.db).await?;
        Ok(self.listing(rows, AuthorColumn::LastName))
    }

    pub async fn create_author(&self, draft: AuthorDraft) -> Result<author::Model> {
        let author = catalog::create_author(&self.ctx.db, draft).await?;
        self.added(EntityKind::Author, author.id);
        Ok(author)
    }

    pub async fn update_author(&self, id: i64, draft: AuthorDraft) -> Result<author::Model> {
        let author = catalog::update_author(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Author, id);
        Ok(author)
    }

    pub async fn archive_author(&self, id: i64) -> Result<author::Model> {
        let author = catalog::archive_author(&self.ctx.db, id).await?;
        self.archived(EntityKind::Author, id);
        Ok(author)
    }

    // Genres

    pub async fn genres(&self) -> Result<Listing<genre::Model, GenreColumn>> {
        let rows = catalog::get_active_genres(&self.ctx.db).await?;
        Ok(self.listing(rows, GenreColumn::Name))
    }

    pub async fn create_genre(&self, draft: GenreDraft) -> Result<genre::Model> {
        let genre = catalog::create_genre(&self.ctx.db, draft).await?;
        self.added(EntityKind::Genre, genre.id);
        Ok(genre)
    }

    pub async fn update_genre(&self, id: i64, draft: GenreDraft) -> Result<genre::Model> {
        let genre = catalog::update_genre(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Genre, id);
        Ok(genre)
    }

    pub async fn archive_genre(&self, id: i64) -> Result<genre::Model> {
        let genre = catalog::archive_genre(&self.ctx.db, id).await?;
        self.archived(EntityKind::Genre, id);
        Ok(genre)
    }

    // Formats

    pub async fn formats(&self) -> Result<Listing<format::Model, FormatColumn>> {
        let rows = catalog::get_active_formats(&self.ctx.db).await?;
        Ok(self.listing(rows, FormatColumn::Kind))
    }

    pub async fn create_format(&self, draft: FormatDraft) -> Result<format::Model> {
        let format = catalog::create_format(&self.ctx.db, draft).await?;
        self.added(EntityKind::Format, format.id);
        Ok(format)
    }

    pub async fn update_format(&self, id: i64, draft: FormatDraft) -> Result<format::Model> {
        let format = catalog::update_format(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Format, id);
        Ok(format)
    }

    pub async fn archive_format(&self, id: i64) -> Result<format::Model> {
        let format = catalog::archive_format(&self.ctx.db, id).await?;
        self.archived(EntityKind::Format, id);
        Ok(format)
    }

    // Publishers

    pub async fn publishers(&self) -> Result<Listing<publisher::Model, PublisherColumn>> {
        let rows = catalog::get_active_publishers(&self.ctx.db).await?;
        Ok(self.listing(rows, PublisherColumn::Name))
    }

    pub async fn create_publisher(&self, draft: PublisherDraft) -> Result<publisher::Model> {
        let publisher = catalog::create_publisher(&self.ctx.db, draft).await?;
        self.added(EntityKind::Publisher, publisher.id);
        Ok(publisher)
    }

    pub async fn update_publisher(
        &self,
        id: i64,
        draft: PublisherDraft,
    ) -> Result<publisher::Model> {
        let publisher = catalog::update_publisher(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Publisher, id);
        Ok(publisher)
    }

    pub async fn archive_publisher(&self, id: i64) -> Result<publisher::Model> {
        let publisher = catalog::archive_publisher(&self.ctx.db, id).await?;
        self.archived(EntityKind::Publisher, id);
        Ok(publisher)
    }

    // Books and copies

    /// A fresh listing of every active book.
    pub async fn book_listing(&self) -> Result<BookListing> {
        BookListing::load(&self.ctx.db, self.ctx.settings.page_size).await
    }

    pub async fn create_book(&self, draft: BookDraft) -> Result<book::Model> {
        let book = catalog::create_book(&self.ctx.db, draft).await?;
        self.added(EntityKind::Book, book.id);
        Ok(book)
    }

    pub async fn update_book(&self, id: i64, draft: BookDraft) -> Result<book::Model> {
        let book = catalog::update_book(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Book, id);
        Ok(book)
    }

    pub async fn archive_book(&self, id: i64) -> Result<book::Model> {
        let book = catalog::archive_book(&self.ctx.db, id).await?;
        self.archived(EntityKind::Book, id);
        Ok(book)
    }

    /// Active copies of `book_id`.
    pub async fn copies(&self, book_id: i64) -> Result<Listing<book_copy::Model, CopyColumn>> {
        let rows = catalog::get_copies_for_book(&self.ctx.db, book_id).await?;
        Ok(self.listing(rows, CopyColumn::Id))
    }

    pub async fn create_copy(&self, draft: BookCopyDraft) -> Result<book_copy::Model> {
        let copy = catalog::create_copy(&self.ctx.db, draft).await?;
        self.added(EntityKind::Copy, copy.id);
        Ok(copy)
    }

    pub async fn update_copy(&self, id: i64, draft: BookCopyDraft) -> Result<book_copy::Model> {
        let copy = catalog::update_copy(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Copy, id);
        Ok(copy)
    }

    pub async fn archive_copy(&self, id: i64) -> Result<book_copy::Model> {
        let copy = catalog::archive_copy(&self.ctx.db, id).await?;
        self.archived(EntityKind::Copy, id);
        Ok(copy)
    }

    // Members

    pub async fn members(&self) -> Result<Listing<member::Model, MemberColumn>> {
        let rows = members::get_active_members(&self.ctx.db).await?;
        Ok(self.listing(rows, MemberColumn::LastName))
    }

    pub async fn create_member(&self, draft: MemberDraft) -> Result<member::Model> {
        let member = members::register_member(&self.ctx.db, draft).await?;
        self.added(EntityKind::Member, member.id);
        Ok(member)
    }

    pub async fn update_member(&self, id: i64, draft: MemberDraft) -> Result<member::Model> {
        let member = members::update_member(&self.ctx.db, id, draft).await?;
        self.updated(EntityKind::Member, id);
        Ok(member)
    }

    pub async fn archive_member(&self, id: i64) -> Result<member::Model> {
        let member = members::archive_member(&self.ctx.db, id).await?;
        self.archived(EntityKind::Member, id);
        Ok(member)
    }

    // Lending

    /// Copies currently out, for picking what to check in.
    pub async fn checked_out_copies(&self) -> Result<Listing<Loan, LoanColumn>> {
        let rows = lending::checked_out_copies(&self.ctx.db).await?;
        Ok(self.listing(rows, LoanColumn::DueDate))
    }

    /// Checks the selected copies in as of today.
    pub async fn return_copies(&self, copy_ids: &[i64]) -> Result<Vec<transaction_detail::Model>> {
        let closed = lending::return_copies(&self.ctx.db, copy_ids, self.ctx.today()).await?;
        self.ctx.announce(LibraryEvent::Returned {
            copy_ids: copy_ids.to_vec(),
        });
        Ok(closed)
    }

    pub async fn transactions(&self) -> Result<Listing<TransactionRow, TransactionColumn>> {
        let rows = lending::list_transactions(&self.ctx.db).await?;
        Ok(self.listing(rows, TransactionColumn::CheckOutDate))
    }

    // Reports

    pub async fn overdue_report(&self) -> Result<Vec<OverdueCopy>> {
        report::overdue_copies(&self.ctx.db, self.ctx.today()).await
    }

    pub async fn checkouts_by_author(&self) -> Result<Vec<CheckoutCount>> {
        report::checkouts_by_author(&self.ctx.db).await
    }

    pub async fn checkouts_by_format(&self) -> Result<Vec<CheckoutCount>> {
        report::checkouts_by_format(&self.ctx.db).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::Settings;
    use crate::errors::Error;
    use crate::events::drain;
    use crate::session::{Console, login};
    use crate::test_utils::*;

    async fn admin_console(fixture: &CatalogFixture) -> AdminConsole {
        admin_console_with(fixture, Settings::default()).await
    }

    async fn admin_console_with(fixture: &CatalogFixture, settings: Settings) -> AdminConsole {
        create_test_administrator(&fixture.db, "ahirt", "ahirt")
            .await
            .unwrap();
        let ctx = LibraryContext::new(fixture.db.clone(), settings)
            .with_fixed_date(date(2015, 9, 30));
        match login(&ctx, "ahirt", "ahirt").await.unwrap() {
            Console::Administrator(console) => console,
            Console::Member(_) => panic!("expected an administrator console"),
        }
    }

    #[tokio::test]
    async fn test_catalog_changes_publish_events() -> Result<()> {
        let fixture = setup_catalog().await?;
        let admin = admin_console(&fixture).await;
        let mut events = admin.context().events.subscribe();

        let genre = admin
            .create_genre(GenreDraft {
                name: "Travel".to_string(),
            })
            .await?;
        admin
            .update_genre(
                genre.id,
                GenreDraft {
                    name: "Travel Writing".to_string(),
                },
            )
            .await?;
        admin.archive_genre(genre.id).await?;

        assert_eq!(
            drain(&mut events),
            vec![
                LibraryEvent::Added {
                    kind: EntityKind::Genre,
                    id: genre.id
                },
                LibraryEvent::Updated {
                    kind: EntityKind::Genre,
                    id: genre.id
                },
                LibraryEvent::Archived {
                    kind: EntityKind::Genre,
                    id: genre.id
                },
            ]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_record_lists_page_and_sort() -> Result<()> {
        let fixture = setup_catalog().await?;
        let settings = Settings {
            page_size: 2,
            ..Settings::default()
        };
        let admin = admin_console_with(&fixture, settings).await;
        for name in ["Travel", "Humor", "Mystery"] {
            create_test_genre(&fixture.db, name).await?;
        }
        let archived = create_test_genre(&fixture.db, "Poetry").await?;
        admin.archive_genre(archived.id).await?;

        let mut genres = admin.genres().await?;
        let names = |l: &Listing<genre::Model, GenreColumn>| {
            l.visible().iter().map(|g| g.name.clone()).collect::<Vec<_>>()
        };
        assert_eq!(genres.len(), 4);
        assert_eq!(genres.pager().page_count(), 2);
        assert_eq!(names(&genres), vec!["Classic", "Humor"]);

        genres.next_page()?;
        assert_eq!(names(&genres), vec!["Mystery", "Travel"]);
        assert!(genres.next_page().is_err());

        genres.sort_by(GenreColumn::Name);
        assert_eq!(genres.pager().current_page(), 1);
        assert_eq!(names(&genres), vec!["Travel", "Mystery"]);
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_change_publishes_nothing() -> Result<()> {
        let fixture = setup_catalog().await?;
        let admin = admin_console(&fixture).await;
        let mut events = admin.context().events.subscribe();

        let result = admin.create_author(AuthorDraft::default()).await;
        assert!(matches!(result, Err(Error::Validation { .. })));
        assert!(drain(&mut events).is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_return_and_reports() -> Result<()> {
        let fixture = setup_catalog().await?;
        let admin = admin_console(&fixture).await;
        let member = create_test_member(&fixture.db, "paigeturner", "turner").await?;
        let copy = create_test_copy(&fixture.db, &fixture).await?;
        lending::checkout_copies(&fixture.db, member.id, &[copy.id], date(2015, 9, 1), 21).await?;

        // Console date is 2015-09-30, eight days past due
        let overdue = admin.overdue_report().await?;
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].days_overdue, 8);

        let out = admin.checked_out_copies().await?;
        assert_eq!(out.len(), 1);

        let mut events = admin.context().events.subscribe();
        let closed = admin.return_copies(&[copy.id]).await?;
        assert_eq!(closed[0].check_in_date, Some(date(2015, 9, 30)));
        assert_eq!(
            drain(&mut events),
            vec![LibraryEvent::Returned {
                copy_ids: vec![copy.id]
            }]
        );

        assert!(admin.checked_out_copies().await?.is_empty());
        assert!(admin.overdue_report().await?.is_empty());
        assert_eq!(admin.checkouts_by_author().await?[0].name, "Lee, Harper");
        assert_eq!(admin.transactions().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_listing_follows_admin_changes() -> Result<()> {
        let fixture = setup_catalog().await?;
        let admin = admin_console(&fixture).await;
        let mut events = admin.context().events.subscribe();
        let mut listing = admin.book_listing().await?;
        assert_eq!(listing.listing().len(), 1);

        admin.archive_book(fixture.book.id).await?;
        for event in drain(&mut events) {
            listing.apply(&admin.context().db, &event).await?;
        }
        assert!(listing.visible().is_empty());
        Ok(())
    }
}
