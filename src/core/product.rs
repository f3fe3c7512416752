//! Product business logic - Handles all product-related operations.
//!
//! Products are the household items being tracked. Saving a product is the primary
//! operation; scheduling its reminders afterwards is best-effort. A failure there is
//! logged and reported back as a warning on [`SavedProduct`], never as a failed save.
//!
//! Visibility: a user sees their own products plus the products shared with their family.

use crate::{
    core::{
        family, reminder,
        settings::{self, LeadTimes},
    },
    entities::{
        Category, Notification, Product, Reminder, notification, product,
        reminder as reminder_entity,
    },
    errors::{Error, Result},
};
use chrono::NaiveDate;
use sea_orm::{Condition, QueryOrder, Set, TransactionTrait, prelude::*, sea_query::Expr};
use tracing::{info, instrument, warn};

/// Fields a user can set on a product, as submitted by a form or command.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductInput {
    /// Required product name
    pub name: String,
    /// Brand or manufacturer
    pub brand: Option<String>,
    /// Category to file the product under
    pub category_id: Option<i64>,
    /// Batch / lot number
    pub batch_number: Option<String>,
    /// Purchase day
    pub purchase_date: Option<NaiveDate>,
    /// Expiry day
    pub expiry_date: Option<NaiveDate>,
    /// Warranty end day
    pub warranty_date: Option<NaiveDate>,
    /// Price paid
    pub price: Option<f64>,
    /// Store name
    pub store_name: Option<String>,
    /// Barcode or QR payload
    pub barcode: Option<String>,
    /// Notes
    pub notes: Option<String>,
    /// Share the product with the owner's family
    pub share_with_family: bool,
}

/// Result of a product save.
#[derive(Debug, Clone)]
pub struct SavedProduct {
    /// The persisted product
    pub product: product::Model,
    /// Reminders now scheduled for it
    pub reminders: Vec<reminder_entity::Model>,
    /// Set when reminder scheduling failed; the product itself was saved
    pub reminder_warning: Option<String>,
}

/// Parses a `YYYY-MM-DD` date typed by a user.
pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| Error::Validation {
        message: format!("{field} must be a date in YYYY-MM-DD format, got '{value}'"),
    })
}

fn clean(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate(input: &ProductInput) -> Result<()> {
    if input.name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Product name cannot be empty".to_string(),
        });
    }
    if let Some(price) = input.price {
        if !price.is_finite() || price < 0.0 {
            return Err(Error::InvalidAmount { amount: price });
        }
    }
    Ok(())
}

async fn ensure_category(
    db: &DatabaseConnection,
    user_id: &str,
    category_id: Option<i64>,
) -> Result<()> {
    let Some(category_id) = category_id else {
        return Ok(());
    };
    let found = Category::find_by_id(category_id).one(db).await?;
    match found {
        Some(category) if category.user_id == user_id => Ok(()),
        _ => Err(Error::CategoryNotFound {
            name: category_id.to_string(),
        }),
    }
}

async fn visibility_condition(db: &DatabaseConnection, user_id: &str) -> Result<Condition> {
    let mut condition = Condition::any().add(product::Column::UserId.eq(user_id));
    if let Some(membership) = family::get_membership(db, user_id).await? {
        condition = condition.add(product::Column::FamilyId.eq(membership.family_id));
    }
    Ok(condition)
}

/// Schedules reminders for a freshly saved product using the owner's current settings.
///
/// Never fails: problems are logged and returned as a warning string.
async fn schedule_best_effort(
    db: &DatabaseConnection,
    saved: &product::Model,
    defaults: LeadTimes,
) -> (Vec<reminder_entity::Model>, Option<String>) {
    let scheduled: Result<Vec<reminder_entity::Model>> = async {
        let user_settings = settings::get_or_create_settings(db, &saved.user_id, defaults).await?;
        reminder::schedule_reminders(db, saved, LeadTimes::from(&user_settings)).await
    }
    .await;

    match scheduled {
        Ok(reminders) => (reminders, None),
        Err(e) => {
            warn!("Failed to schedule reminders for product {}: {}", saved.id, e);
            let warning = "The product was saved, but its reminders could not be scheduled.";
            (Vec::new(), Some(warning.to_string()))
        }
    }
}

/// Creates a product for `user_id` and schedules its reminders.
///
/// `defaults` are the lead times used if the user has no settings row yet.
///
/// # Errors
/// Returns an error if:
/// - The name is empty or the price is negative / not finite
/// - The category does not exist or belongs to someone else
/// - The product insert fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn create_product(
    db: &DatabaseConnection,
    user_id: &str,
    input: ProductInput,
    defaults: LeadTimes,
) -> Result<SavedProduct> {
    validate(&input)?;
    ensure_category(db, user_id, input.category_id).await?;

    let family_id = if input.share_with_family {
        family::get_membership(db, user_id).await?.map(|m| m.family_id)
    } else {
        None
    };

    let now = chrono::Utc::now();
    let product = product::ActiveModel {
        user_id: Set(user_id.to_string()),
        family_id: Set(family_id),
        name: Set(input.name.trim().to_string()),
        brand: Set(clean(input.brand)),
        category_id: Set(input.category_id),
        batch_number: Set(clean(input.batch_number)),
        purchase_date: Set(input.purchase_date),
        expiry_date: Set(input.expiry_date),
        warranty_date: Set(input.warranty_date),
        price: Set(input.price),
        store_name: Set(clean(input.store_name)),
        barcode: Set(clean(input.barcode)),
        notes: Set(clean(input.notes)),
        is_consumed: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    };
    let saved = product.insert(db).await?;
    info!("Created product {} for user {}", saved.id, user_id);

    let (reminders, reminder_warning) = schedule_best_effort(db, &saved, defaults).await;
    Ok(SavedProduct {
        product: saved,
        reminders,
        reminder_warning,
    })
}

/// Replaces the editable fields of a product and reschedules its reminders.
///
/// # Errors
/// Returns an error if:
/// - The input fails validation
/// - The product no longer exists or is not visible to the user
/// - The update fails
#[instrument(skip(db, input), fields(name = %input.name))]
pub async fn update_product(
    db: &DatabaseConnection,
    user_id: &str,
    product_id: i64,
    input: ProductInput,
    defaults: LeadTimes,
) -> Result<SavedProduct> {
    validate(&input)?;
    let existing = get_visible_product(db, user_id, product_id).await?;
    ensure_category(db, &existing.user_id, input.category_id).await?;

    let family_id = if input.share_with_family {
        family::get_membership(db, &existing.user_id)
            .await?
            .map(|m| m.family_id)
    } else {
        None
    };

    let mut product: product::ActiveModel = existing.into();
    product.family_id = Set(family_id);
    product.name = Set(input.name.trim().to_string());
    product.brand = Set(clean(input.brand));
    product.category_id = Set(input.category_id);
    product.batch_number = Set(clean(input.batch_number));
    product.purchase_date = Set(input.purchase_date);
    product.expiry_date = Set(input.expiry_date);
    product.warranty_date = Set(input.warranty_date);
    product.price = Set(input.price);
    product.store_name = Set(clean(input.store_name));
    product.barcode = Set(clean(input.barcode));
    product.notes = Set(clean(input.notes));
    product.updated_at = Set(chrono::Utc::now());

    let saved = product.update(db).await?;
    let (reminders, reminder_warning) = schedule_best_effort(db, &saved, defaults).await;
    Ok(SavedProduct {
        product: saved,
        reminders,
        reminder_warning,
    })
}

/// Retrieves a product the user may see, or a stale-reference error.
pub async fn get_visible_product(
    db: &DatabaseConnection,
    user_id: &str,
    product_id: i64,
) -> Result<product::Model> {
    Product::find_by_id(product_id)
        .filter(visibility_condition(db, user_id).await?)
        .one(db)
        .await?
        .ok_or(Error::ProductNotFound { id: product_id })
}

/// All products visible to the user (own + family-shared), newest first.
pub async fn get_visible_products(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(visibility_condition(db, user_id).await?)
        .order_by_desc(product::Column::CreatedAt)
        .order_by_desc(product::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds visible products by case-insensitive name match.
pub async fn find_products_by_name(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<Vec<product::Model>> {
    let needle = name.trim().to_lowercase();
    Ok(get_visible_products(db, user_id)
        .await?
        .into_iter()
        .filter(|p| p.name.to_lowercase().contains(&needle))
        .collect())
}

async fn ensure_all_visible(
    db: &DatabaseConnection,
    user_id: &str,
    product_ids: &[i64],
) -> Result<()> {
    let visible = Product::find()
        .filter(product::Column::Id.is_in(product_ids.to_vec()))
        .filter(visibility_condition(db, user_id).await?)
        .all(db)
        .await?;
    if let Some(missing) = product_ids
        .iter()
        .find(|id| !visible.iter().any(|p| p.id == **id))
    {
        return Err(Error::ProductNotFound { id: *missing });
    }
    Ok(())
}

/// Marks the given products as consumed. Returns the number of rows updated.
///
/// Existing reminders and notifications are kept; consumed products simply stop
/// producing new notifications.
#[instrument(skip(db))]
pub async fn mark_consumed(
    db: &DatabaseConnection,
    user_id: &str,
    product_ids: &[i64],
) -> Result<u64> {
    if product_ids.is_empty() {
        return Ok(0);
    }
    ensure_all_visible(db, user_id, product_ids).await?;

    let result = Product::update_many()
        .col_expr(product::Column::IsConsumed, Expr::value(true))
        .col_expr(product::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
        .filter(product::Column::Id.is_in(product_ids.to_vec()))
        .exec(db)
        .await?;
    Ok(result.rows_affected)
}

/// Deletes the given products together with their reminders, as one unit.
///
/// Notifications that mention a deleted product are kept, with the reference cleared.
#[instrument(skip(db))]
pub async fn delete_products(
    db: &DatabaseConnection,
    user_id: &str,
    product_ids: &[i64],
) -> Result<u64> {
    if product_ids.is_empty() {
        return Ok(0);
    }
    ensure_all_visible(db, user_id, product_ids).await?;

    let txn = db.begin().await?;
    Reminder::delete_many()
        .filter(reminder_entity::Column::ProductId.is_in(product_ids.to_vec()))
        .exec(&txn)
        .await?;
    Notification::update_many()
        .col_expr(notification::Column::ProductId, Expr::value(Option::<i64>::None))
        .filter(notification::Column::ProductId.is_in(product_ids.to_vec()))
        .exec(&txn)
        .await?;
    let deleted = Product::delete_many()
        .filter(product::Column::Id.is_in(product_ids.to_vec()))
        .exec(&txn)
        .await?;
    txn.commit().await?;

    info!("Deleted {} product(s) for user {}", deleted.rows_affected, user_id);
    Ok(deleted.rows_affected)
}

/// The user's own products that are consumed or already expired.
pub async fn find_restock_candidates(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<Vec<product::Model>> {
    Product::find()
        .filter(product::Column::UserId.eq(user_id))
        .filter(
            Condition::any()
                .add(product::Column::IsConsumed.eq(true))
                .add(product::Column::ExpiryDate.lt(today)),
        )
        .order_by_asc(product::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{events::EventBus, notification as feed, status};
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_product_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_product(&db, "alice", product_input("   "), LeadTimes::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let mut negative = product_input("Soap");
        negative.price = Some(-1.0);
        let result = create_product(&db, "alice", negative, LeadTimes::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: -1.0 }
        ));

        let mut nan = product_input("Soap");
        nan.price = Some(f64::NAN);
        let result = create_product(&db, "alice", nan, LeadTimes::default()).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));
    }

    #[test]
    fn test_parse_date() {
        assert_eq!(
            parse_date("expiry", "2024-02-29").unwrap(),
            NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()
        );
        assert!(matches!(
            parse_date("expiry", "29/02/2024").unwrap_err(),
            Error::Validation { message: _ }
        ));
    }

    #[tokio::test]
    async fn test_create_product_trims_and_defaults() -> Result<()> {
        let db = setup_test_db().await?;

        let mut input = product_input("  Paracetamol  ");
        input.brand = Some("  ".to_string());
        input.price = Some(4.5);
        let saved = create_product(&db, "alice", input, LeadTimes::default()).await?;

        assert_eq!(saved.product.name, "Paracetamol");
        assert_eq!(saved.product.brand, None);
        assert_eq!(saved.product.price, Some(4.5));
        assert!(!saved.product.is_consumed);
        assert!(saved.reminders.is_empty());
        assert!(saved.reminder_warning.is_none());
        Ok(())
    }

    #[tokio::test]
    async fn test_reminder_failure_does_not_fail_the_save() -> Result<()> {
        let db = setup_test_db().await?;
        db.execute_unprepared("DROP TABLE reminders").await?;
        let mut input = product_input("Yogurt");
        input.expiry_date = Some(status::today() + Duration::days(10));

        let saved = create_product(&db, "alice", input, LeadTimes::default()).await?;

        assert!(saved.reminders.is_empty());
        assert!(saved.reminder_warning.is_some());
        let stored = get_visible_product(&db, "alice", saved.product.id).await?;
        assert_eq!(stored.name, "Yogurt");
        Ok(())
    }

    #[tokio::test]
    async fn test_invalid_input_touches_no_table() -> Result<()> {
        let db = setup_test_db().await?;

        let result = create_product(&db, "alice", product_input(" "), LeadTimes::default()).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let settings_rows = crate::entities::NotificationSettings::find().count(&db).await?;
        assert_eq!(settings_rows, 0);
        assert!(get_visible_products(&db, "alice").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_stored_settings_win_over_defaults() -> Result<()> {
        let db = setup_test_db().await?;
        settings::update_settings(
            &db,
            "alice",
            settings::SettingsUpdate {
                expiry_reminder_days: Some(2),
                ..Default::default()
            },
        )
        .await?;

        let mut input = product_input("Cream");
        input.expiry_date = Some(status::today() + Duration::days(20));
        let defaults = LeadTimes {
            expiry_days: 9,
            warranty_days: 30,
        };
        let saved = create_product(&db, "alice", input, defaults).await?;
        assert_eq!(saved.reminders[0].days_before, 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_unknown_category_is_rejected() -> Result<()> {
        let db = setup_test_db().await?;
        let mut input = product_input("Shampoo");
        input.category_id = Some(999);

        let result = create_product(&db, "alice", input, LeadTimes::default()).await;
        assert!(matches!(result.unwrap_err(), Error::CategoryNotFound { name: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_resaving_unchanged_product_keeps_one_reminder_per_kind() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();
        let mut input = product_input("Coffee");
        input.expiry_date = Some(today + Duration::days(60));
        input.warranty_date = Some(today + Duration::days(90));

        let saved = create_product(&db, "alice", input.clone(), LeadTimes::default()).await?;
        let resaved =
            update_product(&db, "alice", saved.product.id, input, LeadTimes::default()).await?;

        assert_eq!(resaved.reminders.len(), 2);
        let stored = reminder::get_reminders_for_product(&db, saved.product.id).await?;
        assert_eq!(stored.len(), 2);
        Ok(())
    }

    #[tokio::test]
    async fn test_update_uses_current_lead_time() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();
        let mut input = product_input("Vitamins");
        input.expiry_date = Some(today + Duration::days(60));

        let saved = create_product(&db, "alice", input.clone(), LeadTimes::default()).await?;
        assert_eq!(saved.reminders[0].days_before, 7);

        settings::update_settings(
            &db,
            "alice",
            settings::SettingsUpdate {
                expiry_reminder_days: Some(14),
                ..Default::default()
            },
        )
        .await?;

        // Existing reminder is not touched by the settings change alone
        let stored = reminder::get_reminders_for_product(&db, saved.product.id).await?;
        assert_eq!(stored[0].days_before, 7);

        let resaved =
            update_product(&db, "alice", saved.product.id, input, LeadTimes::default()).await?;
        assert_eq!(resaved.reminders[0].days_before, 14);
        assert_eq!(resaved.reminders[0].reminder_date, today + Duration::days(46));
        Ok(())
    }

    #[tokio::test]
    async fn test_update_missing_product_is_stale_reference() -> Result<()> {
        let db = setup_test_db().await?;
        let result =
            update_product(&db, "alice", 404, product_input("Ghost"), LeadTimes::default()).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: 404 }));
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_products_are_invisible() -> Result<()> {
        let db = setup_test_db().await?;
        let bobs = create_test_product(&db, "bob", "Bob's tea").await?;

        assert!(get_visible_products(&db, "alice").await?.is_empty());
        let result = mark_consumed(&db, "alice", &[bobs.id]).await;
        assert!(matches!(result.unwrap_err(), Error::ProductNotFound { id: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_family_shared_products_are_visible() -> Result<()> {
        let db = setup_test_db().await?;
        let fam = family::create_family(&db, "bob", "Household").await?;
        family::add_member(&db, fam.id, "alice", crate::entities::FamilyRole::Member).await?;

        let mut shared = product_input("Shared rice");
        shared.share_with_family = true;
        create_product(&db, "bob", shared, LeadTimes::default()).await?;
        create_test_product(&db, "bob", "Private razor").await?;

        let visible = get_visible_products(&db, "alice").await?;
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].name, "Shared rice");
        Ok(())
    }

    #[tokio::test]
    async fn test_mark_consumed_bulk() -> Result<()> {
        let db = setup_test_db().await?;
        let a = create_test_product(&db, "alice", "Apples").await?;
        let b = create_test_product(&db, "alice", "Bananas").await?;

        let updated = mark_consumed(&db, "alice", &[a.id, b.id]).await?;
        assert_eq!(updated, 2);
        let products = get_visible_products(&db, "alice").await?;
        assert!(products.iter().all(|p| p.is_consumed));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_cascades_reminders_but_keeps_notifications() -> Result<()> {
        let db = setup_test_db().await?;
        let events = EventBus::default();
        let today = status::today();

        let milk =
            create_product_with_dates(&db, "alice", "Milk", Some(today + Duration::days(2)), None)
                .await?;
        let promoted = reminder::promote_due_reminders(&db, &events, today).await?;
        assert_eq!(promoted.len(), 1);

        let deleted = delete_products(&db, "alice", &[milk.id]).await?;
        assert_eq!(deleted, 1);

        assert!(reminder::get_reminders_for_product(&db, milk.id).await?.is_empty());
        let page = feed::fetch_recent(&db, "alice", 50).await?;
        assert_eq!(page.notifications.len(), 1);
        assert_eq!(page.notifications[0].product_id, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_restock_candidates() -> Result<()> {
        let db = setup_test_db().await?;
        let today = status::today();

        let used = create_test_product(&db, "alice", "Detergent").await?;
        mark_consumed(&db, "alice", &[used.id]).await?;
        create_product_with_dates(&db, "alice", "Old bread", Some(today - Duration::days(1)), None)
            .await?;
        let tomorrow = Some(today + Duration::days(1));
        create_product_with_dates(&db, "alice", "Fresh bread", tomorrow, None).await?;

        let candidates = find_restock_candidates(&db, "alice", today).await?;
        let names: Vec<_> = candidates.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Detergent", "Old bread"]);
        Ok(())
    }
}
