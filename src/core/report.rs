//! Report generation business logic.
//!
//! Reports are read-only views over the lending ledger. All functions return
//! structured rows that a presentation layer formats as it sees fit.

use crate::{
    entities::{
        Book, BookCopy, Member, Transaction, TransactionDetail, author, book, book_copy, format,
        member, transaction_detail,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{JoinType, QueryOrder, QuerySelect, RelationTrait, prelude::*, sea_query::Expr};
use std::cmp::Reverse;

/// A copy that is checked out past its due date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverdueCopy {
    pub copy: book_copy::Model,
    pub book: book::Model,
    pub detail: transaction_detail::Model,
    /// Member holding the copy
    pub member: member::Model,
    /// Whole days past the due date
    pub days_overdue: i64,
}

/// Number of checkouts attributed to one author or format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckoutCount {
    pub name: String,
    pub checkouts: i64,
}

/// Copies whose most recent loan (by due date) is still open and past due,
/// longest overdue first.
pub async fn overdue_copies(db: &DatabaseConnection, today: NaiveDate) -> Result<Vec<OverdueCopy>> {
    let details = TransactionDetail::find()
        .order_by_asc(transaction_detail::Column::BookCopyId)
        .order_by_desc(transaction_detail::Column::DueDate)
        .all(db)
        .await?;

    let mut report = Vec::new();
    let mut last_copy = None;
    for detail in details {
        // Only the first row per copy is its latest loan
        if last_copy == Some(detail.book_copy_id) {
            continue;
        }
        last_copy = Some(detail.book_copy_id);
        if !detail.is_overdue(today) {
            continue;
        }

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
        let transaction = Transaction::find_by_id(detail.transaction_id)
            .one(db)
            .await?
            .ok_or(Error::NotFound {
                entity: "Transaction",
                id: detail.transaction_id,
            })?;
        let member = Member::find_by_id(transaction.member_id)
            .one(db)
            .await?
            .ok_or(Error::NotFound {
                entity: "Member",
                id: transaction.member_id,
            })?;

        report.push(OverdueCopy {
            days_overdue: (today - detail.due_date).num_days(),
            copy,
            book,
            detail,
            member,
        });
    }

    report.sort_by_key(|row| (Reverse(row.days_overdue), row.copy.id));
    Ok(report)
}

fn rank(mut counts: Vec<CheckoutCount>) -> Vec<CheckoutCount> {
    counts.sort_by(|a, b| b.checkouts.cmp(&a.checkouts).then_with(|| a.name.cmp(&b.name)));
    counts
}

/// Total transaction details per author, as "Last, First".
pub async fn checkouts_by_author(db: &DatabaseConnection) -> Result<Vec<CheckoutCount>> {
    let rows: Vec<(String, String, i64)> = TransactionDetail::find()
        .select_only()
        .join(JoinType::InnerJoin, transaction_detail::Relation::BookCopy.def())
        .join(JoinType::InnerJoin, book_copy::Relation::Book.def())
        .join(JoinType::InnerJoin, book::Relation::Author.def())
        .column(author::Column::LastName)
        .column(author::Column::FirstName)
        .column_as(
            Expr::col((TransactionDetail, transaction_detail::Column::Id)).count(),
            "checkouts",
        )
        .group_by(author::Column::Id)
        .group_by(author::Column::LastName)
        .group_by(author::Column::FirstName)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rank(
        rows.into_iter()
            .map(|(last_name, first_name, checkouts)| CheckoutCount {
                name: format!("{last_name}, {first_name}"),
                checkouts,
            })
            .collect(),
    ))
}

/// Total transaction details per format type.
pub async fn checkouts_by_format(db: &DatabaseConnection) -> Result<Vec<CheckoutCount>> {
    let rows: Vec<(String, i64)> = TransactionDetail::find()
        .select_only()
        .join(JoinType::InnerJoin, transaction_detail::Relation::BookCopy.def())
        .join(JoinType::InnerJoin, book_copy::Relation::Format.def())
        .column(format::Column::Kind)
        .column_as(
            Expr::col((TransactionDetail, transaction_detail::Column::Id)).count(),
            "checkouts",
        )
        .group_by(format::Column::Id)
        .group_by(format::Column::Kind)
        .into_tuple()
        .all(db)
        .await?;

    Ok(rank(
        rows.into_iter()
            .map(|(name, checkouts)| CheckoutCount { name, checkouts })
            .collect(),
    ))
}
