//! Seeding of demonstration data into an empty database.
//!
//! Seed rows are inserted as-is, without form validation, inside a single
//! database transaction. A database counts as empty when it has no
//! administrator, since nobody could log in to it otherwise.

use crate::{
    config::seed::SeedConfig,
    core::auth::{hash_password, new_token},
    entities::{
        Administrator, BookCopy, administrator, author, book, book_copy, format, genre, member,
        publisher, transaction, transaction_detail,
    },
    errors::{Error, Result},
};
use sea_orm::{
    DatabaseTransaction, PaginatorTrait, Set, TransactionTrait, prelude::*,
    sea_query::Expr,
};
use std::collections::BTreeSet;
use tracing::{debug, info};

/// Maps a 1-based seed position to the id inserted for it.
fn resolve(ids: &[i64], what: &str, position: usize) -> Result<i64> {
    position
        .checked_sub(1)
        .and_then(|index| ids.get(index))
        .copied()
        .ok_or_else(|| Error::Config {
            message: format!("Seed {what} reference {position} is outside 1..={}", ids.len()),
        })
}

/// Inserts `seed` if the database has no administrator yet.
///
/// Returns `true` when data was inserted.
pub async fn seed_if_empty(db: &DatabaseConnection, seed: &SeedConfig) -> Result<bool> {
    let administrators = Administrator::find().count(db).await?;
    if administrators > 0 {
        debug!(administrators, "Database already populated, skipping seed");
        return Ok(false);
    }

    let txn = db.begin().await?;
    insert_seed(&txn, seed).await?;
    txn.commit().await?;

    info!(
        authors = seed.authors.len(),
        books = seed.books.len(),
        copies = seed.copies.len(),
        members = seed.members.len(),
        transactions = seed.transactions.len(),
        "Seeded demonstration data"
    );
    Ok(true)
}

async fn insert_seed(txn: &DatabaseTransaction, seed: &SeedConfig) -> Result<()> {
    for account in &seed.administrators {
        let token = new_token();
        administrator::ActiveModel {
            username: Set(account.username.clone()),
            password: Set(hash_password(&account.password, &token)),
            token: Set(token),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    let mut author_ids = Vec::with_capacity(seed.authors.len());
    for row in &seed.authors {
        let model = author::ActiveModel {
            first_name: Set(row.first_name.clone()),
            last_name: Set(row.last_name.clone()),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        author_ids.push(model.id);
    }

    let mut genre_ids = Vec::with_capacity(seed.genres.len());
    for row in &seed.genres {
        let model = genre::ActiveModel {
            name: Set(row.name.clone()),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        genre_ids.push(model.id);
    }

    let mut format_ids = Vec::with_capacity(seed.formats.len());
    for row in &seed.formats {
        let model = format::ActiveModel {
            kind: Set(row.name.clone()),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        format_ids.push(model.id);
    }

    let mut publisher_ids = Vec::with_capacity(seed.publishers.len());
    for row in &seed.publishers {
        let model = publisher::ActiveModel {
            name: Set(row.name.clone()),
            location: Set(row.location.clone()),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        publisher_ids.push(model.id);
    }

    let mut book_ids = Vec::with_capacity(seed.books.len());
    for row in &seed.books {
        let model = book::ActiveModel {
            title: Set(row.title.clone()),
            isbn: Set(row.isbn.clone()),
            author_id: Set(resolve(&author_ids, "author", row.author)?),
            genre_id: Set(resolve(&genre_ids, "genre", row.genre)?),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        book_ids.push(model.id);
    }

    let mut copy_ids = Vec::with_capacity(seed.copies.len());
    for row in &seed.copies {
        let model = book_copy::ActiveModel {
            book_id: Set(resolve(&book_ids, "book", row.book)?),
            format_id: Set(resolve(&format_ids, "format", row.format)?),
            publisher_id: Set(resolve(&publisher_ids, "publisher", row.publisher)?),
            copyright_year: Set(row.copyright_year),
            number_of_pages: Set(row.number_of_pages),
            shelf_number: Set(row.shelf_number.clone()),
            is_available: Set(true),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        copy_ids.push(model.id);
    }

    let mut member_ids = Vec::with_capacity(seed.members.len());
    for row in &seed.members {
        let token = new_token();
        let model = member::ActiveModel {
            first_name: Set(row.first_name.clone()),
            last_name: Set(row.last_name.clone()),
            username: Set(row.username.clone()),
            password: Set(hash_password(&row.password, &token)),
            token: Set(token),
            is_archived: Set(false),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        member_ids.push(model.id);
    }

    let mut transaction_ids = Vec::with_capacity(seed.transactions.len());
    for row in &seed.transactions {
        let model = transaction::ActiveModel {
            check_out_date: Set(row.check_out_date),
            member_id: Set(resolve(&member_ids, "member", row.member)?),
            ..Default::default()
        }
        .insert(txn)
        .await?;
        transaction_ids.push(model.id);
    }

    let mut lent_out = BTreeSet::new();
    for row in &seed.details {
        let copy_id = resolve(&copy_ids, "copy", row.copy)?;
        if row.check_in_date.is_none() {
            lent_out.insert(copy_id);
        }
        transaction_detail::ActiveModel {
            transaction_id: Set(resolve(&transaction_ids, "transaction", row.transaction)?),
            book_copy_id: Set(copy_id),
            due_date: Set(row.due_date),
            check_in_date: Set(row.check_in_date),
            ..Default::default()
        }
        .insert(txn)
        .await?;
    }

    // Availability must agree with the open details just inserted
    if !lent_out.is_empty() {
        BookCopy::update_many()
            .col_expr(book_copy::Column::IsAvailable, Expr::value(false))
            .filter(book_copy::Column::Id.is_in(lent_out))
            .exec(txn)
            .await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::config::seed::load_seed;
    use crate::core::{auth::authenticate, lending::checked_out_copies};
    use crate::entities::{Book, Member, TransactionDetail};
    use crate::test_utils::*;

    fn bundled_seed() -> SeedConfig {
        load_seed(concat!(env!("CARGO_MANIFEST_DIR"), "/seed.toml")).unwrap()
    }

    #[tokio::test]
    async fn test_seed_populates_empty_database() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = bundled_seed();

        assert!(seed_if_empty(&db, &seed).await?);

        assert_eq!(Administrator::find().count(&db).await?, 3);
        assert_eq!(Member::find().count(&db).await?, 11);
        assert_eq!(Book::find().count(&db).await?, seed.books.len() as u64);
        assert_eq!(
            TransactionDetail::find().count(&db).await?,
            seed.details.len() as u64
        );

        // Seeded plaintext passwords are usable for login
        let admin = &seed.administrators[0];
        authenticate(&db, &admin.username, &admin.password).await?;
        let member = &seed.members[0];
        authenticate(&db, &member.username, &member.password).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_availability_matches_open_details() -> Result<()> {
        let db = setup_test_db().await?;
        seed_if_empty(&db, &bundled_seed()).await?;

        let mut unavailable: Vec<i64> = BookCopy::find()
            .filter(book_copy::Column::IsAvailable.eq(false))
            .all(&db)
            .await?
            .into_iter()
            .map(|copy| copy.id)
            .collect();
        let open: Vec<i64> = checked_out_copies(&db)
            .await?
            .into_iter()
            .map(|loan| loan.copy.id)
            .collect();
        unavailable.sort_unstable();
        assert!(!open.is_empty());
        assert_eq!(unavailable, open);
        Ok(())
    }

    #[tokio::test]
    async fn test_seed_runs_only_once() -> Result<()> {
        let db = setup_test_db().await?;
        let seed = bundled_seed();

        assert!(seed_if_empty(&db, &seed).await?);
        assert!(!seed_if_empty(&db, &seed).await?);
        assert_eq!(Administrator::find().count(&db).await?, 3);
        Ok(())
    }
}
