//! Notification settings - per-user reminder lead times and delivery preferences.
//!
//! Settings rows are created lazily with defaults on first access. Lead times leave this
//! module as an explicit [`LeadTimes`] value that callers hand to the reminder generator.

use crate::{
    entities::{NotificationSettings, notification_settings},
    errors::{Error, Result},
};
use sea_orm::{Set, prelude::*};
use tracing::{info, instrument};

/// Default expiry lead time in days
pub const DEFAULT_EXPIRY_REMINDER_DAYS: i32 = 7;
/// Default warranty lead time in days
pub const DEFAULT_WARRANTY_REMINDER_DAYS: i32 = 30;

/// Lead times in effect when reminders are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LeadTimes {
    /// Days before an expiry date
    pub expiry_days: i32,
    /// Days before a warranty end
    pub warranty_days: i32,
}

impl Default for LeadTimes {
    fn default() -> Self {
        Self {
            expiry_days: DEFAULT_EXPIRY_REMINDER_DAYS,
            warranty_days: DEFAULT_WARRANTY_REMINDER_DAYS,
        }
    }
}

impl From<&notification_settings::Model> for LeadTimes {
    fn from(settings: &notification_settings::Model) -> Self {
        Self {
            expiry_days: settings.expiry_reminder_days,
            warranty_days: settings.warranty_reminder_days,
        }
    }
}

/// Partial update of a user's settings. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default)]
pub struct SettingsUpdate {
    /// New expiry lead time
    pub expiry_reminder_days: Option<i32>,
    /// New warranty lead time
    pub warranty_reminder_days: Option<i32>,
    /// Toggle email delivery
    pub email_notifications: Option<bool>,
    /// Toggle push delivery
    pub push_notifications: Option<bool>,
    /// Toggle the daily digest
    pub daily_digest: Option<bool>,
}

fn validate_lead_time(label: &str, days: i32) -> Result<()> {
    if days <= 0 {
        return Err(Error::Validation {
            message: format!("{label} reminder days must be a positive number of days"),
        });
    }
    Ok(())
}

/// Returns the user's settings, inserting a default row if none exists yet.
///
/// `defaults` supplies the lead times for a freshly created row.
#[instrument(skip(db))]
pub async fn get_or_create_settings(
    db: &DatabaseConnection,
    user_id: &str,
    defaults: LeadTimes,
) -> Result<notification_settings::Model> {
    if let Some(existing) = NotificationSettings::find()
        .filter(notification_settings::Column::UserId.eq(user_id))
        .one(db)
        .await?
    {
        return Ok(existing);
    }

    info!("Creating default notification settings for user {}", user_id);
    let settings = notification_settings::ActiveModel {
        user_id: Set(user_id.to_string()),
        expiry_reminder_days: Set(defaults.expiry_days),
        warranty_reminder_days: Set(defaults.warranty_days),
        email_notifications: Set(true),
        push_notifications: Set(true),
        daily_digest: Set(false),
        updated_at: Set(chrono::Utc::now()),
        ..Default::default()
    };
    settings.insert(db).await.map_err(Into::into)
}

/// Applies a partial update to the user's settings.
///
/// Lead times must be positive; invalid input is rejected before touching the store.
/// Existing reminders keep the dates computed when they were scheduled.
#[instrument(skip(db))]
pub async fn update_settings(
    db: &DatabaseConnection,
    user_id: &str,
    update: SettingsUpdate,
) -> Result<notification_settings::Model> {
    if let Some(days) = update.expiry_reminder_days {
        validate_lead_time("Expiry", days)?;
    }
    if let Some(days) = update.warranty_reminder_days {
        validate_lead_time("Warranty", days)?;
    }

    let current = get_or_create_settings(db, user_id, LeadTimes::default()).await?;
    let mut settings: notification_settings::ActiveModel = current.into();

    if let Some(days) = update.expiry_reminder_days {
        settings.expiry_reminder_days = Set(days);
    }
    if let Some(days) = update.warranty_reminder_days {
        settings.warranty_reminder_days = Set(days);
    }
    if let Some(flag) = update.email_notifications {
        settings.email_notifications = Set(flag);
    }
    if let Some(flag) = update.push_notifications {
        settings.push_notifications = Set(flag);
    }
    if let Some(flag) = update.daily_digest {
        settings.daily_digest = Set(flag);
    }
    settings.updated_at = Set(chrono::Utc::now());

    settings.update(db).await.map_err(Into::into)
}
