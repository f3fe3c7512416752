//! Family member entity - Binds a user to a family with a role.
//!
//! A user belongs to at most one family (`user_id` is unique).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a member inside a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum FamilyRole {
    /// Creator of the family
    #[sea_orm(string_value = "owner")]
    Owner,
    /// May invite members
    #[sea_orm(string_value = "admin")]
    Admin,
    /// Regular member
    #[sea_orm(string_value = "member")]
    Member,
}

impl FamilyRole {
    /// Whether this role may send invitations.
    #[must_use]
    pub const fn can_invite(self) -> bool {
        matches!(self, Self::Owner | Self::Admin)
    }
}

/// Family member database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "family_members")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Family joined
    pub family_id: i64,
    /// Member user
    #[sea_orm(unique)]
    pub user_id: String,
    /// Role inside the family
    pub role: FamilyRole,
    /// When the user joined
    pub joined_at: DateTimeUtc,
}

/// Defines relationships between `FamilyMember` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each membership belongs to one family
    #[sea_orm(
        belongs_to = "super::family::Entity",
        from = "Column::FamilyId",
        to = "super::family::Column::Id",
        on_delete = "Cascade"
    )]
    Family,
}

impl Related<super::family::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Family.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
