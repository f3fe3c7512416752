//! Product entity - One tracked household item.
//!
//! Products carry the calendar dates (purchase, expiry, warranty) that drive urgency
//! classification, reminder scheduling, and the analytics views. A product belongs to
//! one user and may additionally be shared with that user's family.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Product database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    /// Unique identifier for the product
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning user
    pub user_id: String,
    /// Family the product is shared with, if any
    pub family_id: Option<i64>,
    /// Name of the product (e.g., "Olive Oil", "Ibuprofen")
    pub name: String,
    /// Brand or manufacturer
    pub brand: Option<String>,
    /// Category this product is filed under
    pub category_id: Option<i64>,
    /// Manufacturer batch / lot number
    pub batch_number: Option<String>,
    /// Day the product was bought
    pub purchase_date: Option<Date>,
    /// Best-before / expiry day
    pub expiry_date: Option<Date>,
    /// Last day covered by the warranty
    pub warranty_date: Option<Date>,
    /// Price paid, in the household currency
    pub price: Option<f64>,
    /// Where the product was bought
    pub store_name: Option<String>,
    /// Barcode or QR payload
    pub barcode: Option<String>,
    /// Free-text notes
    pub notes: Option<String>,
    /// Whether the product has been used up
    pub is_consumed: bool,
    /// When the product was created
    pub created_at: DateTimeUtc,
    /// When the product was last modified
    pub updated_at: DateTimeUtc,
}

/// Defines relationships between Product and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each product optionally belongs to one category
    #[sea_orm(
        belongs_to = "super::category::Entity",
        from = "Column::CategoryId",
        to = "super::category::Column::Id"
    )]
    Category,
    /// Each product optionally belongs to one family
    #[sea_orm(
        belongs_to = "super::family::Entity",
        from = "Column::FamilyId",
        to = "super::family::Column::Id",
        on_delete = "SetNull"
    )]
    Family,
    /// One product has up to two reminders (expiry, warranty)
    #[sea_orm(has_many = "super::reminder::Entity")]
    Reminders,
}

impl Related<super::category::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Category.def()
    }
}

impl Related<super::reminder::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Reminders.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
