//! Publisher entity - The house that issued a particular copy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Publisher database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "publisher")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name of the publisher
    pub name: String,
    /// Country or city the publisher is based in
    pub location: Option<String>,
    /// Soft delete flag
    pub is_archived: bool,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::book_copy::Entity")]
    Copies,
}

impl Related<super::book_copy::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Copies.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
