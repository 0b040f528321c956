//! Author entity - A person credited with one or more books.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Author database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "author")]
pub struct Model {
    /// Unique identifier for the author
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Given name, required
    pub first_name: String,
    /// Family name, may be empty for single-name authors
    pub last_name: String,
    /// Soft delete flag - archived authors stay resolvable from their books
    pub is_archived: bool,
}

impl Model {
    /// Display name in "Last, First" form, used for sorting and reports.
    #[must_use]
    pub fn display_name(&self) -> String {
        format!("{}, {}", self.last_name, self.first_name)
    }
}

/// Defines relationships between Author and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One author has many books
    #[sea_orm(has_many = "super::book::Entity")]
    Books,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Books.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
