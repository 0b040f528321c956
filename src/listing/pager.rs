//! Page arithmetic for listings.

use crate::errors::{Error, Result};
use std::ops::Range;

/// 1-based page navigation over `item_count` items.
///
/// There is always at least one page, even with no items. Navigation past
/// either end is an error; it never wraps around.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pager {
    page_size: usize,
    current_page: usize,
    item_count: usize,
}

impl Pager {
    /// Creates a pager on page 1. A zero page size is treated as 1.
    #[must_use]
    pub fn new(page_size: usize, item_count: usize) -> Self {
        Self {
            page_size: page_size.max(1),
            current_page: 1,
            item_count,
        }
    }

    #[must_use]
    pub const fn page_size(&self) -> usize {
        self.page_size
    }

    #[must_use]
    pub const fn current_page(&self) -> usize {
        self.current_page
    }

    #[must_use]
    pub const fn item_count(&self) -> usize {
        self.item_count
    }

    #[must_use]
    pub const fn page_count(&self) -> usize {
        if self.item_count == 0 {
            1
        } else {
            self.item_count.div_ceil(self.page_size)
        }
    }

    #[must_use]
    pub const fn has_next(&self) -> bool {
        self.current_page < self.page_count()
    }

    #[must_use]
    pub const fn has_previous(&self) -> bool {
        self.current_page > 1
    }

    /// Moves to `page`.
    ///
    /// # Errors
    /// Returns [`Error::PageOutOfRange`] unless `1 <= page <= page_count`.
    pub fn go_to(&mut self, page: usize) -> Result<()> {
        let page_count = self.page_count();
        if page == 0 || page > page_count {
            return Err(Error::PageOutOfRange { page, page_count });
        }
        self.current_page = page;
        Ok(())
    }

    pub fn next(&mut self) -> Result<()> {
        self.go_to(self.current_page + 1)
    }

    pub fn previous(&mut self) -> Result<()> {
        self.go_to(self.current_page - 1)
    }

    pub fn first(&mut self) {
        self.current_page = 1;
    }

    pub fn last(&mut self) {
        self.current_page = self.page_count();
    }

    /// Changes the number of items, pulling the current page back inside the
    /// new page count if it shrank.
    pub(crate) fn set_item_count(&mut self, item_count: usize) {
        self.item_count = item_count;
        self.current_page = self.current_page.min(self.page_count());
    }

    /// Indices of the items on the current page.
    #[must_use]
    pub fn range(&self) -> Range<usize> {
        let start = (self.current_page - 1) * self.page_size;
        let end = (start + self.page_size).min(self.item_count);
        start.min(end)..end
    }
}
