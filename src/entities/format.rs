//! Format entity - The physical or digital form of a copy (paperback, e-book, ...).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Format database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "format")]
pub struct Model {
    /// Unique identifier for the format
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the format type (e.g., "Hardcover")
    pub kind: String,
    /// Soft delete flag
    pub is_archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One format is used by many copies
    #[sea_orm(has_many = "super::book_copy::Entity")]
    Copies,
}

impl Related<super::book_copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
