//! Transaction detail entity - One copy's line within a checkout.
//!
//! A detail with no `check_in_date` is an open loan.

use chrono::NaiveDate;
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Transaction detail database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "transaction_detail")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// ID of the owning checkout transaction
    pub transaction_id: i64,
    /// ID of the copy lent out
    pub book_copy_id: i64,
    /// Day the copy is due back
    pub due_date: Date,
    /// Day the copy came back, `None` while still checked out
    pub check_in_date: Option<Date>,
}

impl Model {
    /// Whether this line is still checked out.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        self.check_in_date.is_none()
    }

    /// Whether this line is open and its due date has passed.
    #[must_use]
    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        self.is_open() && self.due_date < today
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::transaction::Entity",
        from = "Column::TransactionId",
        to = "super::transaction::Column::Id"
    )]
    Transaction,
    #[sea_orm(
        belongs_to = "super::book_copy::Entity",
        from = "Column::BookCopyId",
        to = "super::book_copy::Column::Id"
    )]
    BookCopy,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transaction.def()
    }
}

impl Related<super::book_copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::BookCopy.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
