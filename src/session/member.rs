//! The patron's console: browsing, a checkout cart and loan history.

use super::LibraryContext;
use crate::{
    core::{
        catalog,
        lending::{self, Checkout, HistoryEntry, Loan},
    },
    entities::{book_copy, member},
    errors::{Error, Result},
    events::LibraryEvent,
    listing::BookListing,
};

/// Operations available to a logged-in member.
#[derive(Debug, Clone)]
pub struct MemberConsole {
    ctx: LibraryContext,
    account: member::Model,
    cart: Vec<book_copy::Model>,
}

impl MemberConsole {
    pub(super) const fn new(ctx: LibraryContext, account: member::Model) -> Self {
        Self {
            ctx,
            account,
            cart: Vec::new(),
        }
    }

    #[must_use]
    pub const fn account(&self) -> &member::Model {
        &self.account
    }

    #[must_use]
    pub const fn context(&self) -> &LibraryContext {
        &self.ctx
    }

    #[must_use]
    pub fn greeting(&self) -> String {
        format!("Hello, {}!", self.account.first_name)
    }

    /// A fresh listing of every active book.
    pub async fn book_listing(&self) -> Result<BookListing> {
        BookListing::load(&self.ctx.db, self.ctx.settings.page_size).await
    }

    /// Copies of `book_id` that can go in the cart right now.
    pub async fn available_copies(&self, book_id: i64) -> Result<Vec<book_copy::Model>> {
        catalog::get_available_copies_for_book(&self.ctx.db, book_id).await
    }

    /// Puts a copy in the cart. Returns `false` if it was already there.
    ///
    /// # Errors
    /// [`Error::CopyUnavailable`] if the copy is missing, archived or out.
    pub async fn add_to_cart(&mut self, copy_id: i64) -> Result<bool> {
        if self.cart.iter().any(|copy| copy.id == copy_id) {
            return Ok(false);
        }
        let copy = catalog::get_copy_by_id(&self.ctx.db, copy_id)
            .await?
            .filter(|copy| copy.is_available && !copy.is_archived)
            .ok_or(Error::CopyUnavailable { copy_id })?;
        self.cart.push(copy);
        Ok(true)
    }

    /// Takes a copy back out of the cart. Returns `false` if it wasn't there.
    pub fn remove_from_cart(&mut self, copy_id: i64) -> bool {
        let before = self.cart.len();
        self.cart.retain(|copy| copy.id != copy_id);
        self.cart.len() != before
    }

    #[must_use]
    pub fn cart(&self) -> &[book_copy::Model] {
        &self.cart
    }

    /// Checks out everything in the cart as of today and empties it.
    ///
    /// On failure the cart is left as it was so the member can adjust it.
    pub async fn checkout(&mut self) -> Result<Checkout> {
        let copy_ids: Vec<i64> = self.cart.iter().map(|copy| copy.id).collect();
        let checkout = lending::checkout_copies(
            &self.ctx.db,
            self.account.id,
            &copy_ids,
            self.ctx.today(),
            self.ctx.settings.loan_period_days,
        )
        .await?;

        self.cart.clear();
        self.ctx.announce(LibraryEvent::CheckedOut {
            transaction_id: checkout.transaction.id,
            member_id: self.account.id,
            copy_ids,
        });
        Ok(checkout)
    }

    pub async fn has_overdue_items(&self) -> Result<bool> {
        lending::has_overdue_items(&self.ctx.db, self.account.id, self.ctx.today()).await
    }

    pub async fn current_loans(&self) -> Result<Vec<Loan>> {
        lending::current_loans(&self.ctx.db, self.account.id).await
    }

    pub async fn history(&self) -> Result<Vec<HistoryEntry>> {
        lending::member_history(&self.ctx.db, self.account.id).await
    }
}
