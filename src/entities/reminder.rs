//! Reminder entity - The scheduled date on which a product date should be announced.
//!
//! There is at most one reminder per `(product_id, reminder_type)` pair; the schema adds
//! a unique index over those columns so that rescheduling is always an update.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Which product date a reminder tracks
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ReminderType {
    /// The product's expiry date
    #[sea_orm(string_value = "expiry")]
    Expiry,
    /// The product's warranty end date
    #[sea_orm(string_value = "warranty")]
    Warranty,
}

/// Reminder database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "reminders")]
pub struct Model {
    /// Unique identifier for the reminder
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Product the reminder belongs to
    pub product_id: i64,
    /// Which of the product's dates is tracked
    pub reminder_type: ReminderType,
    /// Day on which the reminder becomes due
    pub reminder_date: Date,
    /// Lead time (in days) used to compute `reminder_date`
    pub days_before: i32,
    /// Whether a notification has already been generated from this reminder
    pub is_sent: bool,
    /// When the reminder was first scheduled
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Reminder and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each reminder belongs to one product and disappears with it
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "Cascade"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
