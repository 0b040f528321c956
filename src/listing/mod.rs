//! In-memory listings: a page, a sort order and a cache of loaded rows.
//!
//! Rows are loaded once and then patched as records change, so paging and
//! re-sorting never go back to the database. Sorting always covers every
//! loaded row; the current page is a window onto the sorted whole.

pub mod books;
pub mod pager;
pub mod records;
pub mod sort;

pub use books::{BookColumn, BookListing, BookRow};
pub use pager::Pager;
pub use records::{
    AuthorColumn, CopyColumn, FormatColumn, GenreColumn, LoanColumn, MemberColumn,
    PublisherColumn, TransactionColumn, TransactionRow,
};
pub use sort::{SortBy, SortDirection, SortState};

use crate::errors::Result;

/// Sorted, paged rows of type `T` with sort columns `C`.
#[derive(Debug, Clone)]
pub struct Listing<T, C> {
    rows: Vec<T>,
    pager: Pager,
    sort: SortState<C>,
}

impl<T: SortBy<C>, C: Copy + PartialEq> Listing<T, C> {
    /// Sorts `rows` ascending on `column` and shows the first page.
    #[must_use]
    pub fn new(mut rows: Vec<T>, page_size: usize, column: C) -> Self {
        let sort = SortState::new(column);
        sort.apply(&mut rows);
        let pager = Pager::new(page_size, rows.len());
        Self { rows, pager, sort }
    }

    /// Rows on the current page.
    #[must_use]
    pub fn visible(&self) -> &[T] {
        &self.rows[self.pager.range()]
    }

    /// Every row, in sort order.
    #[must_use]
    pub fn rows(&self) -> &[T] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    #[must_use]
    pub const fn pager(&self) -> &Pager {
        &self.pager
    }

    /// Moves to `page`.
    ///
    /// # Errors
    /// Returns [`Error::PageOutOfRange`](crate::errors::Error::PageOutOfRange)
    /// unless `page` is within the listing's page count.
    pub fn go_to(&mut self, page: usize) -> Result<()> {
        self.pager.go_to(page)
    }

    pub fn next_page(&mut self) -> Result<()> {
        self.pager.next()
    }

    pub fn previous_page(&mut self) -> Result<()> {
        self.pager.previous()
    }

    pub fn first_page(&mut self) {
        self.pager.first();
    }

    pub fn last_page(&mut self) {
        self.pager.last();
    }

    #[must_use]
    pub const fn sort_state(&self) -> &SortState<C> {
        &self.sort
    }

    /// Toggles the sort on `column` and returns to the first page.
    pub fn sort_by(&mut self, column: C) {
        self.sort.toggle(column);
        self.sort.apply(&mut self.rows);
        self.pager.first();
    }

    /// Swaps in a freshly loaded row set, keeping the sort order.
    pub fn replace_all(&mut self, rows: Vec<T>) {
        self.rows = rows;
        self.refresh();
    }

    pub fn push(&mut self, row: T) {
        self.rows.push(row);
        self.refresh();
    }

    /// Replaces the first row matching `same` with `row`, or adds it.
    pub fn upsert<F: Fn(&T) -> bool>(&mut self, row: T, same: F) {
        match self.rows.iter_mut().find(|existing| same(existing)) {
            Some(existing) => *existing = row,
            None => self.rows.push(row),
        }
        self.refresh();
    }

    /// Drops every row matching `predicate` and returns how many went.
    pub fn remove_where<F: Fn(&T) -> bool>(&mut self, predicate: F) -> usize {
        let before = self.rows.len();
        self.rows.retain(|row| !predicate(row));
        let removed = before - self.rows.len();
        if removed > 0 {
            self.refresh();
        }
        removed
    }

    fn refresh(&mut self) {
        self.sort.apply(&mut self.rows);
        self.pager.set_item_count(self.rows.len());
    }
}
