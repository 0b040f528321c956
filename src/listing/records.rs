//! Sort columns for the administrator's record lists.
//!
//! Each list is a [`Listing`](super::Listing) over active records of one
//! kind, sorted ascending on its first column when loaded.

use super::SortBy;
use crate::{
    core::lending::Loan,
    entities::{author, book_copy, format, genre, member, publisher, transaction},
};
use std::cmp::Ordering;

/// A checkout with the member who made it, if that member still exists.
pub type TransactionRow = (transaction::Model, Option<member::Model>);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorColumn {
    LastName,
    FirstName,
}

impl SortBy<AuthorColumn> for author::Model {
    fn compare(&self, other: &Self, column: AuthorColumn) -> Ordering {
        match column {
            AuthorColumn::LastName => self
                .last_name
                .cmp(&other.last_name)
                .then_with(|| self.first_name.cmp(&other.first_name)),
            AuthorColumn::FirstName => self.first_name.cmp(&other.first_name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenreColumn {
    Name,
}

impl SortBy<GenreColumn> for genre::Model {
    fn compare(&self, other: &Self, column: GenreColumn) -> Ordering {
        match column {
            GenreColumn::Name => self.name.cmp(&other.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatColumn {
    Kind,
}

impl SortBy<FormatColumn> for format::Model {
    fn compare(&self, other: &Self, column: FormatColumn) -> Ordering {
        match column {
            FormatColumn::Kind => self.kind.cmp(&other.kind),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PublisherColumn {
    Name,
    Location,
}

impl SortBy<PublisherColumn> for publisher::Model {
    fn compare(&self, other: &Self, column: PublisherColumn) -> Ordering {
        match column {
            PublisherColumn::Name => self.name.cmp(&other.name),
            // Publishers without a location sort first
            PublisherColumn::Location => self.location.cmp(&other.location),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CopyColumn {
    Id,
    CopyrightYear,
    Pages,
    Shelf,
    Available,
}

impl SortBy<CopyColumn> for book_copy::Model {
    fn compare(&self, other: &Self, column: CopyColumn) -> Ordering {
        match column {
            CopyColumn::Id => self.id.cmp(&other.id),
            CopyColumn::CopyrightYear => self.copyright_year.cmp(&other.copyright_year),
            CopyColumn::Pages => self.number_of_pages.cmp(&other.number_of_pages),
            CopyColumn::Shelf => self.shelf_number.cmp(&other.shelf_number),
            CopyColumn::Available => self.is_available.cmp(&other.is_available),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberColumn {
    LastName,
    FirstName,
    Username,
}

impl SortBy<MemberColumn> for member::Model {
    fn compare(&self, other: &Self, column: MemberColumn) -> Ordering {
        match column {
            MemberColumn::LastName => self
                .last_name
                .cmp(&other.last_name)
                .then_with(|| self.first_name.cmp(&other.first_name)),
            MemberColumn::FirstName => self.first_name.cmp(&other.first_name),
            MemberColumn::Username => self.username.cmp(&other.username),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionColumn {
    CheckOutDate,
    Member,
}

impl SortBy<TransactionColumn> for TransactionRow {
    fn compare(&self, other: &Self, column: TransactionColumn) -> Ordering {
        match column {
            TransactionColumn::CheckOutDate => self.0.check_out_date.cmp(&other.0.check_out_date),
            TransactionColumn::Member => {
                let name = |row: &Self| {
                    row.1
                        .as_ref()
                        .map(|m| (m.last_name.clone(), m.first_name.clone()))
                };
                name(self).cmp(&name(other))
            }
        }
    }
}

/// Columns of the checked-out copy list used for returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoanColumn {
    DueDate,
    Title,
    CopyId,
}

impl SortBy<LoanColumn> for Loan {
    fn compare(&self, other: &Self, column: LoanColumn) -> Ordering {
        match column {
            LoanColumn::DueDate => self.detail.due_date.cmp(&other.detail.due_date),
            LoanColumn::Title => self.book.title.cmp(&other.book.title),
            LoanColumn::CopyId => self.copy.id.cmp(&other.copy.id),
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::listing::Listing;
    use crate::test_utils::date;
    use rstest::rstest;

    fn author(id: i64, first: &str, last: &str) -> author::Model {
        author::Model {
            id,
            first_name: first.to_string(),
            last_name: last.to_string(),
            is_archived: false,
        }
    }

    fn authors() -> Vec<author::Model> {
        vec![
            author(1, "Kurt", "Vonnegut"),
            author(2, "Donna", "Tartt"),
            author(3, "Ann", "Patchett"),
            author(4, "David", "Sedaris"),
            author(5, "Amy", "Sedaris"),
        ]
    }

    fn last_names(listing: &Listing<author::Model, AuthorColumn>) -> Vec<&str> {
        listing
            .visible()
            .iter()
            .map(|a| a.last_name.as_str())
            .collect()
    }

    #[test]
    fn author_listing_pages_and_sorts() {
        let mut listing = Listing::new(authors(), 2, AuthorColumn::LastName);
        assert_eq!(listing.pager().page_count(), 3);
        assert_eq!(last_names(&listing), vec!["Patchett", "Sedaris"]);
        // Last name ties fall back to first name
        assert_eq!(listing.visible()[1].first_name, "Amy");

        listing.last_page();
        assert_eq!(last_names(&listing), vec!["Vonnegut"]);

        listing.sort_by(AuthorColumn::LastName);
        assert_eq!(listing.pager().current_page(), 1);
        assert_eq!(last_names(&listing), vec!["Vonnegut", "Tartt"]);
    }

    #[rstest]
    #[case::first_name(AuthorColumn::FirstName, "Amy")]
    #[case::last_name(AuthorColumn::LastName, "Ann")]
    fn author_columns(#[case] column: AuthorColumn, #[case] first: &str) {
        let listing = Listing::new(authors(), 10, column);
        assert_eq!(listing.visible()[0].first_name, first);
    }

    fn transaction_row(id: i64, day: u32, member: Option<&str>) -> TransactionRow {
        let transaction = transaction::Model {
            id,
            check_out_date: date(2015, 9, day),
            member_id: 1,
        };
        let member = member.map(|last| member::Model {
            id: 1,
            first_name: "Test".to_string(),
            last_name: last.to_string(),
            username: last.to_lowercase(),
            password: String::new(),
            token: String::new(),
            is_archived: false,
        });
        (transaction, member)
    }

    #[test]
    fn transactions_sort_by_date_and_member() {
        let rows = vec![
            transaction_row(1, 20, Some("Turner")),
            transaction_row(2, 3, None),
            transaction_row(3, 11, Some("Hirt")),
        ];
        let mut listing = Listing::new(rows, 10, TransactionColumn::CheckOutDate);
        let ids = |l: &Listing<TransactionRow, TransactionColumn>| {
            l.visible().iter().map(|row| row.0.id).collect::<Vec<_>>()
        };
        assert_eq!(ids(&listing), vec![2, 3, 1]);

        // Rows without a member sort first
        listing.sort_by(TransactionColumn::Member);
        assert_eq!(ids(&listing), vec![2, 3, 1]);
        listing.sort_by(TransactionColumn::Member);
        assert_eq!(ids(&listing), vec![1, 3, 2]);
    }
}
