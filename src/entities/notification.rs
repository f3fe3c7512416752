//! Notification entity - A user-facing message in the notification feed.
//!
//! Notifications are produced when a reminder falls due, or ad hoc (test messages).
//! They outlive the product they mention: deleting a product clears `product_id`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum NotificationType {
    /// A product is about to expire
    #[sea_orm(string_value = "expiry")]
    Expiry,
    /// A warranty is about to end
    #[sea_orm(string_value = "warranty")]
    Warranty,
    /// Generic reminder
    #[sea_orm(string_value = "reminder")]
    Reminder,
    /// Informational / diagnostic message
    #[sea_orm(string_value = "info")]
    Info,
}

impl From<super::reminder::ReminderType> for NotificationType {
    fn from(value: super::reminder::ReminderType) -> Self {
        match value {
            super::reminder::ReminderType::Expiry => Self::Expiry,
            super::reminder::ReminderType::Warranty => Self::Warranty,
        }
    }
}

/// Notification database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notifications")]
pub struct Model {
    /// Unique identifier for the notification
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Receiving user
    pub user_id: String,
    /// Product the message is about, if any
    pub product_id: Option<i64>,
    /// Notification type
    pub notification_type: NotificationType,
    /// Short headline
    pub title: String,
    /// Message body
    pub message: String,
    /// Has this notification been read?
    pub is_read: bool,
    /// When the notification was meant to be delivered
    pub scheduled_for: Option<DateTimeUtc>,
    /// When the row was created
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Notification and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Optional product reference, cleared when the product is deleted
    #[sea_orm(
        belongs_to = "super::product::Entity",
        from = "Column::ProductId",
        to = "super::product::Column::Id",
        on_delete = "SetNull"
    )]
    Product,
}

impl Related<super::product::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Product.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
