//! Shopping list business logic - planning lists, their items, and restock suggestions.

use crate::{
    core::product,
    entities::{ItemPriority, ShoppingList, ShoppingListItem, shopping_list, shopping_list_item},
    errors::{Error, Result},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ConnectionTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{info, instrument};

/// Name given to generated restock lists.
pub const RESTOCK_LIST_NAME: &str = "Recommended Restock";

/// Fields of a shopping list item.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemInput {
    /// What to buy
    pub product_name: String,
    /// Preferred brand
    pub brand: Option<String>,
    /// How many
    pub quantity: i32,
    /// Category for the purchase
    pub category_id: Option<i64>,
    /// Purchase priority
    pub priority: ItemPriority,
    /// Expected price
    pub estimated_price: Option<f64>,
    /// Free-text notes
    pub notes: Option<String>,
}

impl ItemInput {
    /// One medium-priority unit of `product_name`.
    #[must_use]
    pub fn named(product_name: &str) -> Self {
        Self {
            product_name: product_name.to_string(),
            brand: None,
            quantity: 1,
            category_id: None,
            priority: ItemPriority::Medium,
            estimated_price: None,
            notes: None,
        }
    }
}

fn validate_item(input: &ItemInput) -> Result<()> {
    if input.product_name.trim().is_empty() {
        return Err(Error::Validation {
            message: "Item name cannot be empty".to_string(),
        });
    }
    if input.quantity < 1 {
        return Err(Error::Validation {
            message: "Quantity must be at least 1".to_string(),
        });
    }
    if let Some(amount) = input.estimated_price {
        if !amount.is_finite() || amount < 0.0 {
            return Err(Error::InvalidAmount { amount });
        }
    }
    Ok(())
}

/// A list together with its items.
#[derive(Debug, Clone, PartialEq)]
pub struct ListWithItems {
    /// The list
    pub list: shopping_list::Model,
    /// Its items, in insertion order
    pub items: Vec<shopping_list_item::Model>,
}

impl ListWithItems {
    /// Items not yet bought.
    #[must_use]
    pub fn open_items(&self) -> usize {
        self.items.iter().filter(|i| !i.is_completed).count()
    }

    /// Sum of known estimated prices, multiplied by quantity.
    #[must_use]
    pub fn estimated_total(&self) -> f64 {
        self.items
            .iter()
            .filter_map(|i| i.estimated_price.map(|p| p * f64::from(i.quantity)))
            .sum()
    }
}

/// Creates an empty list.
#[instrument(skip(db))]
pub async fn create_list(
    db: &DatabaseConnection,
    user_id: &str,
    name: &str,
    description: Option<String>,
) -> Result<shopping_list::Model> {
    insert_list(db, user_id, name, description).await
}

async fn insert_list<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    name: &str,
    description: Option<String>,
) -> Result<shopping_list::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "List name cannot be empty".to_string(),
        });
    }
    let now = Utc::now();
    shopping_list::ActiveModel {
        user_id: Set(user_id.to_string()),
        name: Set(name.to_string()),
        description: Set(description),
        is_completed: Set(false),
        created_at: Set(now),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn insert_item<C: ConnectionTrait>(
    db: &C,
    user_id: &str,
    list_id: i64,
    input: ItemInput,
) -> Result<shopping_list_item::Model> {
    validate_item(&input)?;
    shopping_list_item::ActiveModel {
        shopping_list_id: Set(list_id),
        user_id: Set(user_id.to_string()),
        product_name: Set(input.product_name.trim().to_string()),
        brand: Set(input.brand),
        quantity: Set(input.quantity),
        category_id: Set(input.category_id),
        priority: Set(input.priority),
        estimated_price: Set(input.estimated_price),
        notes: Set(input.notes),
        is_completed: Set(false),
        created_at: Set(Utc::now()),
        ..Default::default()
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

async fn get_owned_list(
    db: &DatabaseConnection,
    user_id: &str,
    list_id: i64,
) -> Result<shopping_list::Model> {
    ShoppingList::find_by_id(list_id)
        .filter(shopping_list::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::ShoppingListNotFound { id: list_id })
}

async fn get_owned_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
) -> Result<shopping_list_item::Model> {
    ShoppingListItem::find_by_id(item_id)
        .filter(shopping_list_item::Column::UserId.eq(user_id))
        .one(db)
        .await?
        .ok_or(Error::ShoppingListNotFound { id: item_id })
}

async fn touch_list(db: &DatabaseConnection, list_id: i64) -> Result<()> {
    if let Some(list) = ShoppingList::find_by_id(list_id).one(db).await? {
        let mut active: shopping_list::ActiveModel = list.into();
        active.updated_at = Set(Utc::now());
        active.update(db).await?;
    }
    Ok(())
}

/// The user's lists, newest first.
pub async fn get_user_lists(
    db: &DatabaseConnection,
    user_id: &str,
) -> Result<Vec<shopping_list::Model>> {
    ShoppingList::find()
        .filter(shopping_list::Column::UserId.eq(user_id))
        .order_by_desc(shopping_list::Column::CreatedAt)
        .order_by_desc(shopping_list::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// One list with its items.
pub async fn get_list(
    db: &DatabaseConnection,
    user_id: &str,
    list_id: i64,
) -> Result<ListWithItems> {
    let list = get_owned_list(db, user_id, list_id).await?;
    let items = ShoppingListItem::find()
        .filter(shopping_list_item::Column::ShoppingListId.eq(list.id))
        .order_by_asc(shopping_list_item::Column::Id)
        .all(db)
        .await?;
    Ok(ListWithItems { list, items })
}

/// Renames a list and replaces its description.
pub async fn rename_list(
    db: &DatabaseConnection,
    user_id: &str,
    list_id: i64,
    name: &str,
    description: Option<String>,
) -> Result<shopping_list::Model> {
    let name = name.trim();
    if name.is_empty() {
        return Err(Error::Validation {
            message: "List name cannot be empty".to_string(),
        });
    }
    let mut active: shopping_list::ActiveModel = get_owned_list(db, user_id, list_id).await?.into();
    active.name = Set(name.to_string());
    active.description = Set(description);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Marks a list done or reopens it.
pub async fn set_list_completed(
    db: &DatabaseConnection,
    user_id: &str,
    list_id: i64,
    completed: bool,
) -> Result<shopping_list::Model> {
    let mut active: shopping_list::ActiveModel = get_owned_list(db, user_id, list_id).await?.into();
    active.is_completed = Set(completed);
    active.updated_at = Set(Utc::now());
    active.update(db).await.map_err(Into::into)
}

/// Deletes a list and its items.
#[instrument(skip(db))]
pub async fn delete_list(db: &DatabaseConnection, user_id: &str, list_id: i64) -> Result<()> {
    let list = get_owned_list(db, user_id, list_id).await?;
    let txn = db.begin().await?;
    ShoppingListItem::delete_many()
        .filter(shopping_list_item::Column::ShoppingListId.eq(list.id))
        .exec(&txn)
        .await?;
    ShoppingList::delete_by_id(list.id).exec(&txn).await?;
    txn.commit().await?;
    info!("Deleted shopping list '{}' for user {}", list.name, user_id);
    Ok(())
}

/// Adds an item to one of the user's lists.
#[instrument(skip(db))]
pub async fn add_item(
    db: &DatabaseConnection,
    user_id: &str,
    list_id: i64,
    input: ItemInput,
) -> Result<shopping_list_item::Model> {
    validate_item(&input)?;
    let list = get_owned_list(db, user_id, list_id).await?;
    let item = insert_item(db, user_id, list.id, input).await?;
    touch_list(db, list.id).await?;
    Ok(item)
}

/// Replaces the fields of an item, keeping its completion state.
pub async fn update_item(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
    input: ItemInput,
) -> Result<shopping_list_item::Model> {
    validate_item(&input)?;
    let existing = get_owned_item(db, user_id, item_id).await?;
    let list_id = existing.shopping_list_id;

    let mut active: shopping_list_item::ActiveModel = existing.into();
    active.product_name = Set(input.product_name.trim().to_string());
    active.brand = Set(input.brand);
    active.quantity = Set(input.quantity);
    active.category_id = Set(input.category_id);
    active.priority = Set(input.priority);
    active.estimated_price = Set(input.estimated_price);
    active.notes = Set(input.notes);
    let updated = active.update(db).await?;
    touch_list(db, list_id).await?;
    Ok(updated)
}

/// Ticks an item off or reopens it.
pub async fn set_item_completed(
    db: &DatabaseConnection,
    user_id: &str,
    item_id: i64,
    completed: bool,
) -> Result<shopping_list_item::Model> {
    let existing = get_owned_item(db, user_id, item_id).await?;
    let list_id = existing.shopping_list_id;
    let mut active: shopping_list_item::ActiveModel = existing.into();
    active.is_completed = Set(completed);
    let updated = active.update(db).await?;
    touch_list(db, list_id).await?;
    Ok(updated)
}

/// Removes an item from its list.
pub async fn remove_item(db: &DatabaseConnection, user_id: &str, item_id: i64) -> Result<()> {
    let existing = get_owned_item(db, user_id, item_id).await?;
    ShoppingListItem::delete_by_id(existing.id).exec(db).await?;
    touch_list(db, existing.shopping_list_id).await
}

/// Builds a new list with one item per consumed or expired product of the user.
#[instrument(skip(db))]
pub async fn generate_restock_list(
    db: &DatabaseConnection,
    user_id: &str,
    today: NaiveDate,
) -> Result<ListWithItems> {
    let candidates = product::find_restock_candidates(db, user_id, today).await?;
    if candidates.is_empty() {
        return Err(Error::NothingToRestock);
    }

    let txn = db.begin().await?;
    let list = insert_list(
        &txn,
        user_id,
        RESTOCK_LIST_NAME,
        Some("Auto-generated based on consumed and expired products".to_string()),
    )
    .await?;
    let mut items = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        let input = ItemInput {
            brand: candidate.brand,
            category_id: candidate.category_id,
            estimated_price: candidate.price,
            ..ItemInput::named(&candidate.name)
        };
        items.push(insert_item(&txn, user_id, list.id, input).await?);
    }
    txn.commit().await?;

    info!("Created restock list with {} item(s) for user {}", items.len(), user_id);
    Ok(ListWithItems { list, items })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use chrono::Duration;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_list_and_item_lifecycle() -> Result<()> {
        let db = setup_test_db().await?;
        let list = create_list(&db, "alice", "Weekly groceries", None).await?;

        let milk = add_item(
            &db,
            "alice",
            list.id,
            ItemInput {
                quantity: 2,
                estimated_price: Some(1.5),
                ..ItemInput::named("Milk")
            },
        )
        .await?;
        let bread = add_item(&db, "alice", list.id, ItemInput::named("Bread")).await?;
        let eggs = add_item(&db, "alice", list.id, ItemInput::named("Egs")).await?;
        set_item_completed(&db, "alice", milk.id, true).await?;

        let fixed = update_item(
            &db,
            "alice",
            eggs.id,
            ItemInput {
                quantity: 12,
                priority: ItemPriority::High,
                ..ItemInput::named("Eggs")
            },
        )
        .await?;
        assert_eq!(fixed.product_name, "Eggs");
        assert_eq!(fixed.quantity, 12);
        assert!(!fixed.is_completed);
        remove_item(&db, "alice", fixed.id).await?;
        assert_eq!(bread.quantity, 1);

        let loaded = get_list(&db, "alice", list.id).await?;
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.open_items(), 1);
        assert!((loaded.estimated_total() - 3.0).abs() < f64::EPSILON);

        let renamed = rename_list(&db, "alice", list.id, "Weekend", None).await?;
        assert_eq!(renamed.name, "Weekend");
        assert!(set_list_completed(&db, "alice", list.id, true).await?.is_completed);

        delete_list(&db, "alice", list.id).await?;
        assert!(get_user_lists(&db, "alice").await?.is_empty());
        assert!(ShoppingListItem::find().all(&db).await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_other_users_lists_are_not_found() -> Result<()> {
        let db = setup_test_db().await?;
        let list = create_list(&db, "alice", "Mine", None).await?;

        let result = add_item(&db, "bob", list.id, ItemInput::named("Eggs")).await;
        assert!(matches!(result.unwrap_err(), Error::ShoppingListNotFound { id: _ }));
        Ok(())
    }

    #[tokio::test]
    async fn test_generate_restock_list() -> Result<()> {
        let db = setup_test_db().await?;
        let today = crate::core::status::today();
        let yogurt = create_product_with_dates(
            &db,
            "alice",
            "Yogurt",
            Some(today - Duration::days(2)),
            None,
        )
        .await?;
        let soap = create_test_product(&db, "alice", "Soap").await?;
        product::mark_consumed(&db, "alice", &[soap.id]).await?;
        create_product_with_dates(&db, "alice", "Rice", Some(today + Duration::days(200)), None)
            .await?;

        let generated = generate_restock_list(&db, "alice", today).await?;
        assert_eq!(generated.list.name, RESTOCK_LIST_NAME);
        let mut names: Vec<_> = generated.items.iter().map(|i| i.product_name.as_str()).collect();
        names.sort_unstable();
        assert_eq!(names, vec!["Soap", yogurt.name.as_str()]);
        assert!(
            generated
                .items
                .iter()
                .all(|i| i.priority == ItemPriority::Medium && i.quantity == 1)
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_nothing_to_restock() -> Result<()> {
        let db = setup_test_db().await?;
        let result = generate_restock_list(&db, "alice", crate::core::status::today()).await;
        assert!(matches!(result.unwrap_err(), Error::NothingToRestock));
        assert!(get_user_lists(&db, "alice").await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_item_validation() {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();
        let zero = add_item(
            &db,
            "alice",
            1,
            ItemInput {
                quantity: 0,
                ..ItemInput::named("Eggs")
            },
        )
        .await;
        assert!(matches!(zero, Err(Error::Validation { message: _ })));

        let negative = add_item(
            &db,
            "alice",
            1,
            ItemInput {
                estimated_price: Some(-2.0),
                ..ItemInput::named("Eggs")
            },
        )
        .await;
        assert!(matches!(negative, Err(Error::InvalidAmount { amount: _ })));
    }
}
