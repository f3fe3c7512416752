//! Family invitation entity - A single-use token that lets an email address join a family.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Family invitation database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "family_invitations")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Family the invitation grants access to
    pub family_id: i64,
    /// Invited email address
    pub email: String,
    /// Opaque single-use token embedded in the invitation link
    #[sea_orm(unique)]
    pub token: String,
    /// User who sent the invitation
    pub invited_by: String,
    /// Invitation is unusable after this instant
    pub expires_at: DateTimeUtc,
    /// When the invitation was redeemed, if it was
    pub used_at: Option<DateTimeUtc>,
    /// When the invitation was created
    pub created_at: DateTimeUtc,
}

impl Model {
    /// Whether the invitation can still be redeemed at `now`.
    #[must_use]
    pub fn is_redeemable(&self, now: DateTimeUtc) -> bool {
        self.used_at.is_none() && self.expires_at > now
    }
}

/// Defines relationships between `FamilyInvitation` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each invitation belongs to one family
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
