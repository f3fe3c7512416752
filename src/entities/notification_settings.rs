//! Notification settings entity - Per-user reminder lead times and delivery preferences.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Notification settings database model (one row per user)
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "notification_settings")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    #[sea_orm(unique)]
    pub user_id: String,
    /// Days before an expiry date that the reminder fires
    pub expiry_reminder_days: i32,
    /// Days before a warranty end that the reminder fires
    pub warranty_reminder_days: i32,
    /// Deliver notifications by email
    pub email_notifications: bool,
    /// Deliver push notifications
    pub push_notifications: bool,
    /// Bundle notifications into a daily digest
    pub daily_digest: bool,
    /// When the settings were last modified
    pub updated_at: DateTimeUtc,
}

/// `NotificationSettings` has no relationships with other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
