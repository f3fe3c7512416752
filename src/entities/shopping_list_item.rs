//! Shopping list item entity - One line of a shopping list.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// How urgently an item should be bought
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ItemPriority {
    /// Nice to have
    #[sea_orm(string_value = "low")]
    Low,
    /// Default priority
    #[sea_orm(string_value = "medium")]
    Medium,
    /// Buy first
    #[sea_orm(string_value = "high")]
    High,
}

/// Shopping list item database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "shopping_list_items")]
pub struct Model {
    /// Unique identifier
    #[sea_orm(primary_key)]
    pub id: i64,
    /// List the item belongs to
    pub shopping_list_id: i64,
    /// Owning user
    pub user_id: String,
    /// What to buy
    pub product_name: String,
    /// Preferred brand
    pub brand: Option<String>,
    /// How many to buy (at least 1)
    pub quantity: i32,
    /// Category to file the purchase under
    pub category_id: Option<i64>,
    /// Purchase priority
    pub priority: ItemPriority,
    /// Expected price
    pub estimated_price: Option<f64>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Whether the item has been bought
    pub is_completed: bool,
    /// When the item was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between `ShoppingListItem` and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each item belongs to one list and is removed with it
    #[sea_orm(
        belongs_to = "super::shopping_list::Entity",
        from = "Column::ShoppingListId",
        to = "super::shopping_list::Column::Id",
        on_delete = "Cascade"
    )]
    ShoppingList,
    /// Optional category, cleared when the category is deleted
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id",
        on_delete = "SetNull"
    )]
    Category,
}

impl Related<super::shopping_list::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::ShoppingList.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
