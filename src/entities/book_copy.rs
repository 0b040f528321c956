//! Book copy entity - One individually lendable instance of a book.
//!
//! `is_available` mirrors the lending ledger: it is false exactly while the
//! copy has a transaction detail without a check-in date.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Book copy database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "book_copy")]
pub struct Model {
    /// Unique identifier for the copy
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the book this is a copy of
    pub book_id: i64,
    /// ID of the copy's format
    pub format_id: i64,
    /// ID of the publisher of this edition
    pub publisher_id: i64,
    /// Copyright year of this edition
    pub copyright_year: i32,
    /// Page count, absent for audio formats
    pub number_of_pages: Option<i32>,
    /// Shelf code (at most four characters), absent for digital copies
    pub shelf_number: Option<String>,
    /// Whether the copy can currently be checked out
    pub is_available: bool,
    /// Soft delete flag
    pub is_archived: bool,
}

/// Defines relationships between BookCopy and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::book::Entity",
        from = "Column::BookId",
        to = "super::book::Column::Id"
    )]
    Book,
    #[sea_orm(
        belongs_to = "super::format::Entity",
        from = "Column::FormatId",
        to = "super::format::Column::Id"
    )]
    Format,
    #[sea_orm(
        belongs_to = "super::publisher::Entity",
        from = "Column::PublisherId",
        to = "super::publisher::Column::Id"
    )]
    Publisher,
    /// Lending history of the copy
    #[sea_orm(has_many = "super::transaction_detail::Entity")]
    TransactionDetails,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Book.def()
    }
}

impl Related<super::format::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Format.def()
    }
}

impl Related<super::publisher::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Publisher.def()
    }
}

impl Related<super::transaction_detail::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::TransactionDetails.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
