//! Member entity - A patron who checks copies out.
//!
//! `password` holds the salted hash, never the plaintext; `token` is the
//! per-member random salt.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "member")]
pub struct Model {
    /// Unique identifier for the member
    #[sea_orm(primary_key)]
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    /// Login name
    pub username: String,
    /// Base64 SHA-256 of password followed by `token`
    pub password: String,
    /// Unique identity token used to salt the password
    #[sea_orm(unique)]
    pub token: String,
    /// Soft delete flag - archived members cannot log in
    pub is_archived: bool,
}

impl Model {
    /// Full name in "First Last" form.
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One member has many checkout transactions
    #[sea_orm(has_many = "super::transaction::Entity")]
    Transactions,
}

impl Related<super::transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Transactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
