//! Category business logic - user-defined product labels.

use crate::{
    entities::{Category, Product, category, product},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use tracing::{info, instrument};

/// Display attributes of a category.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryInput {
    /// Display name, unique per user (case-insensitive)
    pub name: String,
    /// Icon name or emoji
    pub icon: Option<String>,
    /// Display color
    pub color: Option<String>,
    /// Optional description
    pub description: Option<String>,
}

async fn find_by_name(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<Option<category::Model>> {
    let wanted = name.to_lowercase();
    Ok(get_user_categories(db, user_id)
        .await?
        .into_iter()
        .find(|c| c.name.to_lowercase() == wanted))
}

fn validated_name(name: &str) -> Result<String> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "Category name cannot be empty".to_string(),
        });
    }
    Ok(name.to_string())
}

/// Creates a category for the user.
#[instrument(skip(db))]
pub async fn create_category(
    db: &DatabaseConnection,
    user_id: &str,
    input: CategoryInput,
) -> Result<category::Model> {
    let name = validated_name(&input.name)?;
    if find_by_name(db, user_id, &name).await?.is_some() {
        return Err(Error::CategoryExists { name });
    }

    let created = category::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name),
        icon: Set(input.icon),
        color: Set(input.color),
        description: Set(input.description),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await?;
    info!("Created category '{}' for user {}", created.name, user_id);
    Ok(created)
}

/// All categories of the user, alphabetically.
pub async fn get_user_categories(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<category::Model>> {
    Category::find()
        .filter(category::Column::UserId.eq(user_id))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Categories referenced by `products`, whoever owns them.
///
/// Family-shared products carry their owner's category ids, so views over
/// visible products resolve names through this rather than the caller's own list.
pub async fn get_categories_for_products(
    db: &DatabaseConnection,
    products: &[product::Model],
) -> Result<Vec<category::Model>> {
    let mut ids: Vec<i64> = products.iter().filter_map(|p| p.category_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(Vec::new());
    }
    Category::find()
        .filter(category::Column::Id.is_in(ids))
        .order_by_asc(category::Column::Name)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Looks up one of the user's categories by name.
pub async fn get_category_by_name(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
) -> Result<category::Model> {
    find_by_name(db, user_id, name)
        .await?
        .ok_or_else(|| Error::CategoryNotFound {
            name: name.to_string(),
        })
}

/// Replaces the attributes of an existing category.
#[instrument(skip(db))]
pub async fn update_category(
    db: &DatabaseConnection,
    user_id: &str,
    current_name: &str,
    input: CategoryInput,
) -> Result<category::Model> {
    let existing = get_category_by_name(db, user_id, current_name).await?;
    let name = validated_name(&input.name)?;
    if let Some(clash) = find_by_name(db, user_id, &name).await? {
        if clash.id != existing.id {
            return Err(Error::CategoryExists { name });
        }
    }

    let mut active: category::ActiveModel = existing.into();
    active.name = Set(name);
    active.icon = Set(input.icon);
    active.color = Set(input.color);
    active.description = Set(input.description);
    active.update(db).await.map_err(Into::into)
}

/// Deletes a category that no product references.
#[instrument(skip(db))]
pub async fn delete_category(db: &DatabaseConnection, user_id: &str, name: &str) -> Result<()> {
    let existing = get_category_by_name(db, user_id, name).await?;
    let product_count = Product::find()
        .filter(product::Column::CategoryId.eq(existing.id))
        .count(db)
        .await?;
    if product_count > 0 {
        return Err(Error::CategoryInUse {
            name: existing.name,
            product_count,
        });
    }

    Category::delete_by_id(existing.id).exec(db).await?;
    info!("Deleted category '{}' for user {}", existing.name, user_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::{
        analytics::{self, AnalyticsWindow},
        family, product as product_core,
        settings::LeadTimes,
        status,
    };
    use crate::entities::FamilyRole;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn named(name: &str) -> CategoryInput {
        CategoryInput {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_names_are_unique_per_user() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "alice", named("Medicine")).await?;

        let dup = create_category(&db, "alice", named("medicine")).await;
        assert!(matches!(dup.unwrap_err(), Error::CategoryExists { name: _ }));

        // Another user may reuse the name
        create_category(&db, "bob", named("Medicine")).await?;
        assert_eq!(get_user_categories(&db, "alice").await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_shared_products_resolve_owner_categories() -> Result<()> {
        let db = setup_test_db().await?;
        let fam = family::create_family(&db, "bob", "Household").await?;
        family::add_member(&db, fam.id, "alice", FamilyRole::Member).await?;

        let food = create_category(&db, "bob", named("Food")).await?;
        let mut rice = product_input("Rice");
        rice.category_id = Some(food.id);
        rice.price = Some(12.0);
        rice.share_with_family = true;
        product_core::create_product(&db, "bob", rice, LeadTimes::default()).await?;

        let visible = product_core::get_visible_products(&db, "alice").await?;
        let categories = get_categories_for_products(&db, &visible).await?;
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Food");

        let today = status::today();
        let breakdown =
            analytics::category_breakdown(&visible, &categories, today, AnalyticsWindow::SixMonths);
        assert_eq!(breakdown.len(), 1);
        assert_eq!(breakdown[0].name, "Food");
        assert!((breakdown[0].spending - 12.0).abs() < f64::EPSILON);

        let stats = analytics::dashboard_stats(&visible, &categories, today);
        assert_eq!(stats.per_category.get("Food"), Some(&1));
        assert!(!stats.per_category.contains_key(analytics::UNCATEGORIZED));
        Ok(())
    }

    #[tokio::test]
    async fn test_no_categorised_products_loads_nothing() -> Result<()> {
        let db = setup_test_db().await?;
        let plain = create_test_product(&db, "alice", "Salt").await?;
        assert!(get_categories_for_products(&db, &[plain]).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_update_category() -> Result<()> {
        let db = setup_test_db().await?;
        create_category(&db, "alice", named("Food")).await?;
        create_category(&db, "alice", named("Drinks")).await?;

        let updated = update_category(
            &db,
            "alice",
            "food",
            CategoryInput {
                name: "Groceries".to_string(),
                color: Some("#22c55e".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(updated.name, "Groceries");

        let clash = update_category(&db, "alice", "Groceries", named("Drinks")).await;
        assert!(matches!(clash.unwrap_err(), Error::CategoryExists { name: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_guarded_by_products() -> Result<()> {
        let db = setup_test_db().await?;
        let cat = create_category(&db, "alice", named("Electronics")).await?;
        let mut input = product_input("Phone");
        input.category_id = Some(cat.id);
        let saved = product_core::create_product(&db, "alice", input, LeadTimes::default()).await?;

        let blocked = delete_category(&db, "alice", "Electronics").await;
        assert!(matches!(
            blocked.unwrap_err(),
            Error::CategoryInUse { name: _, product_count: 1 }
        ));

        product_core::delete_products(&db, "alice", &[saved.product.id]).await?;
        delete_category(&db, "alice", "Electronics").await?;
        assert!(get_user_categories(&db, "alice").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let result = create_category(&db, "alice", named("   ")).await;
        assert!(matches!(result, Err(Error::Validation { message: _ })));
    }
}
