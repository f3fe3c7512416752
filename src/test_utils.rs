//! Shared test utilities for `PantryBuddy`.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test entities with sensible defaults.

use crate::{
    core::{
        notification::NewNotification,
        product::{self, ProductInput},
        settings::LeadTimes,
    },
    entities::{self, NotificationType},
    errors::Result,
};
use chrono::NaiveDate;
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Product input with only a name set.
#[must_use]
pub fn product_input(name: &str) -> ProductInput {
    ProductInput {
        name: name.to_string(),
        ..Default::default()
    }
}

/// Creates a test product without any tracked dates.
///
/// # Defaults
/// * price: 10.0
/// * lead times: 7 / 30 days
pub async fn create_test_product(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<entities::product::Model> {
    let input = ProductInput {
        price: Some(10.0),
        ..product_input(name)
    };
    Ok(product::create_product(db, user_id, input, LeadTimes::default())
        .await?
        .product)
}

/// Creates a product with the given expiry and warranty dates, using default lead times.
pub async fn create_product_with_dates(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    expiry_date: Option<NaiveDate>,
    warranty_date: Option<NaiveDate>,
) -> Result<entities::product::Model> {
    let input = ProductInput {
        expiry_date,
        warranty_date,
        ..product_input(name)
    };
    Ok(product::create_product(db, user_id, input, LeadTimes::default())
        .await?
        .product)
}

/// An unread `info` notification for `user_id` titled `title`.
#[must_use]
pub fn info_notification(user_id: &str, title: &str) -> NewNotification {
    NewNotification {
        user_id: user_id.to_string(),
        product_id: None,
        notification_type: NotificationType::Info,
        title: title.to_string(),
        message: format!("{title} (test)"),
        scheduled_for: None,
    }
}
