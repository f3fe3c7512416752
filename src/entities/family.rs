//! Family entity - A sharing group whose members see each other's shared products.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Family database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "families")]
pub struct Model {
    /// Unique identifier for the family
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name
    pub name: String,
    /// User who created the family
    pub created_by: String,
    /// When the family was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Family and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One family has many members
    #[sea_orm(has_many = "super::family_member::Entity")]
    Members,
    /// One family has many pending or used invitations
    #[sea_orm(has_many = "super::family_invitation::Entity")]
    Invitations,
}

impl Related<super::family_member::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Members.def()
    }
}

impl Related<super::family_invitation::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Invitations.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
