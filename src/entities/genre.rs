//! Genre entity - A category a book is shelved under.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Genre database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "genre")]
pub struct Model {
    /// Unique identifier for the genre
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Mystery", "Travel")
    pub name: String,
    /// Soft delete flag
    pub is_archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One genre has many books
    #[sea_orm(has_many = "super::book::Entity")]
    Books,
}

impl Related<super::book::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Books.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
