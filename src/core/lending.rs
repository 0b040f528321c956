//! Lending business logic - checkouts, returns and the loan ledger.
//!
//! A copy is lent out by recording a transaction with one detail per copy and
//! flipping the copy to unavailable; it comes back when its open detail gets a
//! check-in date. Both directions run inside a single database transaction so
//! a batch is applied completely or not at all.

use crate::{
    core::members::get_active_member,
    entities::{
        Book, BookCopy, Member, Transaction, TransactionDetail, book, book_copy, member,
        transaction, transaction_detail,
    },
    errors::{Error, Result},
};
use chrono::{Days, NaiveDate};
use sea_orm::{
    PaginatorTrait, QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*, sea_query::Expr,
};
use tracing::{info, instrument, warn};

/// A committed checkout: the transaction and one detail per copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkout {
    pub transaction: transaction::Model,
    pub details: Vec<transaction_detail::Model>,
}

/// An open or closed detail together with the copy and book it refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Loan {
    pub detail: transaction_detail::Model,
    pub copy: book_copy::Model,
    pub book: book::Model,
}

/// One past checkout of a member, newest first in [`member_history`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub transaction: transaction::Model,
    pub details: Vec<transaction_detail::Model>,
}

/// Whether the member has any open loan whose due date is before `today`.
pub async fn has_overdue_items<C: ConnectionTrait>(
    db: &C,
    member_id: i64,
    today: NaiveDate,
) -> Result<bool> {
    let overdue = TransactionDetail::find()
        .inner_join(Transaction)
        .filter(transaction::Column::MemberId.eq(member_id))
        .filter(transaction_detail::Column::CheckInDate.is_null())
        .filter(transaction_detail::Column::DueDate.lt(today))
        .count(db)
        .await?;
    Ok(overdue > 0)
}

/// Checks out a batch of copies to a member.
///
/// Every copy is due `loan_period_days` after `today`. The availability flip
/// is conditional on the copy still being available, so two concurrent
/// checkouts of the same copy cannot both succeed.
///
/// # Errors
/// Returns an error if:
/// - `copy_ids` is empty
/// - The member does not exist or is archived
/// - The member has overdue items
/// - Any copy is missing, archived or already checked out (nothing is written)
/// - The database operation fails
#[instrument(skip(db, copy_ids), fields(copies = copy_ids.len()))]
pub async fn checkout_copies(
    db: &DatabaseConnection,
    member_id: i64,
    copy_ids: &[i64],
    today: NaiveDate,
    loan_period_days: u32,
) -> Result<Checkout> {
    if copy_ids.is_empty() {
        return Err(Error::EmptySelection);
    }

    let due_date = today
        .checked_add_days(Days::new(u64::from(loan_period_days)))
        .ok_or_else(|| Error::Config {
            message: format!("Loan period of {loan_period_days} days is out of range"),
        })?;

    let txn = db.begin().await?;

    get_active_member(&txn, member_id).await?;
    if has_overdue_items(&txn, member_id, today).await? {
        warn!(member_id, "Checkout refused: member has overdue items");
        return Err(Error::OverdueItems { member_id });
    }

    for &copy_id in copy_ids {
        let usable = BookCopy::find_by_id(copy_id)
            .one(&txn)
            .await?
            .is_some_and(|copy| copy.is_available && !copy.is_archived);
        if !usable {
            return Err(Error::CopyUnavailable { copy_id });
        }
    }

    let transaction = transaction::ActiveModel {
        check_out_date: Set(today),
        member_id: Set(member_id),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut details = Vec::with_capacity(copy_ids.len());
    for &copy_id in copy_ids {
        // Dropping `txn` on early return rolls back everything above
        let flipped = BookCopy::update_many()
            .col_expr(book_copy::Column::IsAvailable, Expr::value(false))
            .filter(book_copy::Column::Id.eq(copy_id))
            .filter(book_copy::Column::IsAvailable.eq(true))
            .filter(book_copy::Column::IsArchived.eq(false))
            .exec(&txn)
            .await?;
        if flipped.rows_affected == 0 {
            return Err(Error::CopyUnavailable { copy_id });
        }

        let detail = transaction_detail::ActiveModel {
            transaction_id: Set(transaction.id),
            book_copy_id: Set(copy_id),
            due_date: Set(due_date),
            check_in_date: Set(None),
            ..Default::default()
        }
        .insert(&txn)
        .await?;
        details.push(detail);
    }

    txn.commit().await?;

    info!(
        transaction_id = transaction.id,
        member_id,
        %due_date,
        "Checked out {} copies",
        details.len()
    );
    Ok(Checkout {
        transaction,
        details,
    })
}

/// Checks a batch of copies back in on `today`.
///
/// For each copy the open detail with the latest due date is closed and the
/// copy becomes available again.
///
/// # Errors
/// Returns [`Error::NoOpenLoan`] (and writes nothing) if any copy is not
/// currently checked out.
#[instrument(skip(db, copy_ids), fields(copies = copy_ids.len()))]
pub async fn return_copies(
    db: &DatabaseConnection,
    copy_ids: &[i64],
    today: NaiveDate,
) -> Result<Vec<transaction_detail::Model>> {
    if copy_ids.is_empty() {
        return Err(Error::EmptySelection);
    }

    let txn = db.begin().await?;
    let mut closed = Vec::with_capacity(copy_ids.len());

    for &copy_id in copy_ids {
        let open = TransactionDetail::find()
            .filter(transaction_detail::Column::BookCopyId.eq(copy_id))
            .filter(transaction_detail::Column::CheckInDate.is_null())
            .order_by_desc(transaction_detail::Column::DueDate)
            .one(&txn)
            .await?
            .ok_or(Error::NoOpenLoan { copy_id })?;

        let mut detail: transaction_detail::ActiveModel = open.into();
        detail.check_in_date = Set(Some(today));
        closed.push(detail.update(&txn).await?);

        BookCopy::update_many()
            .col_expr(book_copy::Column::IsAvailable, Expr::value(true))
            .filter(book_copy::Column::Id.eq(copy_id))
            .exec(&txn)
            .await?;
    }

    txn.commit().await?;
    info!("Returned {} copies", closed.len());
    Ok(closed)
}

async fn load_loans<C: ConnectionTrait>(
    db: &C,
    details: Vec<transaction_detail::Model>,
) -> Result<Vec<Loan>> {
    let mut loans = Vec::with_capacity(details.len());
    for detail in details {
        let copy = BookCopy::find_by_id(detail.book_copy_id)
            .one(db)
            .await?
            .ok_or(Error::NotFound {
                entity: "Copy",
                id: detail.book_copy_id,
            })?;
        let book = Book::find_by_id(copy.book_id)
            .one(db)
            .await?
            .ok_or(Error::NotFound {
                entity: "Book",
                id: copy.book_id,
            })?;
        loans.push(Loan { detail, copy, book });
    }
    Ok(loans)
}

/// The member's open loans, soonest due first.
pub async fn current_loans(db: &DatabaseConnection, member_id: i64) -> Result<Vec<Loan>> {
    let details = TransactionDetail::find()
        .inner_join(Transaction)
        .filter(transaction::Column::MemberId.eq(member_id))
        .filter(transaction_detail::Column::CheckInDate.is_null())
        .order_by_asc(transaction_detail::Column::DueDate)
        .order_by_asc(transaction_detail::Column::Id)
        .all(db)
        .await?;
    load_loans(db, details).await
}

/// Every checkout the member has made, newest first, with its details.
pub async fn member_history(db: &DatabaseConnection, member_id: i64) -> Result<Vec<HistoryEntry>> {
    let rows = Transaction::find()
        .filter(transaction::Column::MemberId.eq(member_id))
        .order_by_desc(transaction::Column::CheckOutDate)
        .order_by_desc(transaction::Column::Id)
        .find_with_related(TransactionDetail)
        .all(db)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(transaction, details)| HistoryEntry {
            transaction,
            details,
        })
        .collect())
}

/// All open loans of non-archived copies, for the return screen.
pub async fn checked_out_copies(db: &DatabaseConnection) -> Result<Vec<Loan>> {
    let details = TransactionDetail::find()
        .filter(transaction_detail::Column::CheckInDate.is_null())
        .order_by_asc(transaction_detail::Column::BookCopyId)
        .all(db)
        .await?;

    let mut loans = load_loans(db, details).await?;
    loans.retain(|loan| !loan.copy.is_archived);
    Ok(loans)
}

/// All transactions, newest first, each with its member.
pub async fn list_transactions(
    db: &DatabaseConnection,
) -> Result<Vec<(transaction::Model, Option<member::Model>)>> {
    Transaction::find()
        .order_by_desc(transaction::Column::CheckOutDate)
        .order_by_desc(transaction::Column::Id)
        .find_also_related(Member)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::catalog::{archive_book, archive_copy, get_book_by_id, get_copy_by_id};
    use crate::core::report::overdue_copies;
    use crate::test_utils::*;

    async fn paige(fixture: &CatalogFixture) -> member::Model {
        create_test_member(&fixture.db, "paigeturner", "turner")
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_checkout_sets_due_date_and_availability() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;

        let checkout =
            checkout_copies(&fixture.db, member.id, &[copy.id], date(2015, 9, 1), 21).await?;

        assert_eq!(checkout.transaction.check_out_date, date(2015, 9, 1));
        assert_eq!(checkout.transaction.member_id, member.id);
        assert_eq!(checkout.details.len(), 1);
        assert_eq!(checkout.details[0].due_date, date(2015, 9, 22));
        assert!(checkout.details[0].is_open());

        let copy = get_copy_by_id(&fixture.db, copy.id).await?.unwrap();
        assert!(!copy.is_available);
        Ok(())
    }

    #[tokio::test]
    async fn test_checkout_empty_selection() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let result = checkout_copies(&fixture.db, member.id, &[], date(2015, 9, 1), 21).await;
        assert!(matches!(result, Err(Error::EmptySelection)));
        Ok(())
    }

    #[tokio::test]
    async fn test_overdue_member_cannot_check_out() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let first = create_test_copy(&fixture.db, &fixture).await?;
        let second = create_test_copy(&fixture.db, &fixture).await?;

        checkout_copies(&fixture.db, member.id, &[first.id], date(2015, 9, 1), 21).await?;

        // Due on the 22nd: not overdue that day, overdue the day after
        assert!(!has_overdue_items(&fixture.db, member.id, date(2015, 9, 22)).await?);
        assert!(has_overdue_items(&fixture.db, member.id, date(2015, 9, 23)).await?);

        let result =
            checkout_copies(&fixture.db, member.id, &[second.id], date(2015, 9, 23), 21).await;
        assert!(matches!(result, Err(Error::OverdueItems { .. })));

        let second = get_copy_by_id(&fixture.db, second.id).await?.unwrap();
        assert!(second.is_available);
        Ok(())
    }

    #[tokio::test]
    async fn test_unavailable_copy_rejects_whole_batch() -> Result<()> {
        let fixture = setup_catalog().await?;
        let first = paige(&fixture).await;
        let second = create_test_member(&fixture.db, "bookworm", "pw").await?;
        let taken = create_test_copy(&fixture.db, &fixture).await?;
        let free = create_test_copy(&fixture.db, &fixture).await?;

        checkout_copies(&fixture.db, first.id, &[taken.id], date(2015, 9, 1), 21).await?;

        let result = checkout_copies(
            &fixture.db,
            second.id,
            &[free.id, taken.id],
            date(2015, 9, 2),
            21,
        )
        .await;
        assert!(matches!(result, Err(Error::CopyUnavailable { copy_id }) if copy_id == taken.id));

        // Nothing from the failed batch was written
        let free = get_copy_by_id(&fixture.db, free.id).await?.unwrap();
        assert!(free.is_available);
        assert_eq!(Transaction::find().count(&fixture.db).await?, 1);
        assert_eq!(TransactionDetail::find().count(&fixture.db).await?, 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_duplicate_copy_in_batch_is_rejected() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;

        let result = checkout_copies(
            &fixture.db,
            member.id,
            &[copy.id, copy.id],
            date(2015, 9, 1),
            21,
        )
        .await;
        assert!(matches!(result, Err(Error::CopyUnavailable { .. })));

        let copy = get_copy_by_id(&fixture.db, copy.id).await?.unwrap();
        assert!(copy.is_available);
        assert_eq!(Transaction::find().count(&fixture.db).await?, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_archived_copy_cannot_be_checked_out() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;
        archive_copy(&fixture.db, copy.id).await?;

        let result =
            checkout_copies(&fixture.db, member.id, &[copy.id], date(2015, 9, 1), 21).await;
        assert!(matches!(result, Err(Error::CopyUnavailable { .. })));
        Ok(())
    }

    #[tokio::test]
    async fn test_history_resolves_archived_book_and_copy() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;
        checkout_copies(&fixture.db, member.id, &[copy.id], date(2015, 9, 1), 21).await?;

        archive_copy(&fixture.db, copy.id).await?;
        archive_book(&fixture.db, fixture.book.id).await?;

        let loans = current_loans(&fixture.db, member.id).await?;
        assert_eq!(loans.len(), 1);
        assert_eq!(loans[0].copy.id, copy.id);
        assert!(loans[0].copy.is_archived);
        assert_eq!(loans[0].book.title, "To Kill a Mockingbird");
        assert!(loans[0].book.is_archived);

        let history = member_history(&fixture.db, member.id).await?;
        assert_eq!(history.len(), 1);
        let detail = &history[0].details[0];
        let lent = get_copy_by_id(&fixture.db, detail.book_copy_id).await?.unwrap();
        let book = get_book_by_id(&fixture.db, lent.book_id).await?.unwrap();
        assert_eq!(book.id, fixture.book.id);

        let overdue = overdue_copies(&fixture.db, date(2015, 10, 1)).await?;
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].copy.id, copy.id);
        assert_eq!(overdue[0].book.id, fixture.book.id);
        assert_eq!(overdue[0].member.id, member.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_return_closes_loan() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;
        checkout_copies(&fixture.db, member.id, &[copy.id], date(2015, 9, 1), 21).await?;

        let closed = return_copies(&fixture.db, &[copy.id], date(2015, 9, 30)).await?;
        assert_eq!(closed.len(), 1);
        assert_eq!(closed[0].check_in_date, Some(date(2015, 9, 30)));

        let copy = get_copy_by_id(&fixture.db, copy.id).await?.unwrap();
        assert!(copy.is_available);
        assert!(!has_overdue_items(&fixture.db, member.id, date(2016, 1, 1)).await?);
        assert!(current_loans(&fixture.db, member.id).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_return_without_open_loan_fails() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let lent = create_test_copy(&fixture.db, &fixture).await?;
        let shelved = create_test_copy(&fixture.db, &fixture).await?;
        checkout_copies(&fixture.db, member.id, &[lent.id], date(2015, 9, 1), 21).await?;

        let result = return_copies(&fixture.db, &[lent.id, shelved.id], date(2015, 9, 5)).await;
        assert!(matches!(result, Err(Error::NoOpenLoan { copy_id }) if copy_id == shelved.id));

        // The valid half of the batch was rolled back too
        let lent = get_copy_by_id(&fixture.db, lent.id).await?.unwrap();
        assert!(!lent.is_available);
        assert_eq!(current_loans(&fixture.db, member.id).await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_return_closes_latest_due_detail() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let copy = create_test_copy(&fixture.db, &fixture).await?;

        // Two open details for one copy can only come from imported data
        for (checked_out, due) in [
            (date(2015, 8, 1), date(2015, 8, 22)),
            (date(2015, 9, 1), date(2015, 9, 22)),
        ] {
            let transaction = transaction::ActiveModel {
                check_out_date: Set(checked_out),
                member_id: Set(member.id),
                ..Default::default()
            }
            .insert(&fixture.db)
            .await?;
            transaction_detail::ActiveModel {
                transaction_id: Set(transaction.id),
                book_copy_id: Set(copy.id),
                due_date: Set(due),
                check_in_date: Set(None),
                ..Default::default()
            }
            .insert(&fixture.db)
            .await?;
        }

        let closed = return_copies(&fixture.db, &[copy.id], date(2015, 9, 10)).await?;
        assert_eq!(closed[0].due_date, date(2015, 9, 22));

        let still_open = current_loans(&fixture.db, member.id).await?;
        assert_eq!(still_open.len(), 1);
        assert_eq!(still_open[0].detail.due_date, date(2015, 8, 22));
        Ok(())
    }

    #[tokio::test]
    async fn test_history_and_loans() -> Result<()> {
        let fixture = setup_catalog().await?;
        let member = paige(&fixture).await;
        let first = create_test_copy(&fixture.db, &fixture).await?;
        let second = create_test_copy(&fixture.db, &fixture).await?;
        let third = create_test_copy(&fixture.db, &fixture).await?;

        checkout_copies(&fixture.db, member.id, &[first.id], date(2015, 9, 1), 21).await?;
        return_copies(&fixture.db, &[first.id], date(2015, 9, 10)).await?;
        checkout_copies(
            &fixture.db,
            member.id,
            &[second.id, third.id],
            date(2015, 9, 12),
            21,
        )
        .await?;

        let history = member_history(&fixture.db, member.id).await?;
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].transaction.check_out_date, date(2015, 9, 12));
        assert_eq!(history[0].details.len(), 2);
        assert_eq!(history[1].details.len(), 1);
        assert!(!history[1].details[0].is_open());

        let loans = current_loans(&fixture.db, member.id).await?;
        assert_eq!(loans.len(), 2);
        assert!(loans.iter().all(|loan| loan.book.id == fixture.book.id));

        let open = checked_out_copies(&fixture.db).await?;
        let ids: Vec<i64> = open.iter().map(|loan| loan.copy.id).collect();
        assert_eq!(ids, vec![second.id, third.id]);

        let transactions = list_transactions(&fixture.db).await?;
        assert_eq!(transactions.len(), 2);
        assert_eq!(transactions[0].1.as_ref().unwrap().id, member.id);
        Ok(())
    }
}
