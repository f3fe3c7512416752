//! Shopping list entity - A named planning list of items to buy.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Shopping list database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_lists")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// List name (e.g., "Weekly groceries")
    pub name: String,
    /// Optional description
    pub description: Option<String>,
    /// Whether the whole list is done
    pub is_completed: bool,
    /// When the list was created
    pub created_at: DateTimeUtc,
    /// When the list was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between `ShoppingList` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One list has many items
    #[sea_orm(has_many = "super::shopping_list_item::Entity")]
    Items,
}

impl Related<super::shopping_list_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
