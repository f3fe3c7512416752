//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod category;
pub mod family;
pub mod family_invitation;
pub mod family_member;
pub mod notification;
pub mod notification_settings;
pub mod product;
pub mod reminder;
pub mod shopping_list;
pub mod shopping_list_item;

// Re-export specific types to avoid conflicts
pub use category::{Column as CategoryColumn, Entity as Category, Model as CategoryModel};
pub use family::{Column as FamilyColumn, Entity as Family, Model as FamilyModel};
pub use family_invitation::{
    Column as FamilyInvitationColumn, Entity as FamilyInvitation, Model as FamilyInvitationModel,
};
pub use family_member::{
    Column as FamilyMemberColumn, Entity as FamilyMember, FamilyRole, Model as FamilyMemberModel,
};
pub use notification::{
    Column as NotificationColumn, Entity as Notification, Model as NotificationModel,
    NotificationType,
};
pub use notification_settings::{
    Column as NotificationSettingsColumn, Entity as NotificationSettings,
    Model as NotificationSettingsModel,
};
pub use product::{Column as ProductColumn, Entity as Product, Model as ProductModel};
pub use reminder::{
    Column as ReminderColumn, Entity as Reminder, Model as ReminderModel, ReminderType,
};
pub use shopping_list::{
    Column as ShoppingListColumn, Entity as ShoppingList, Model as ShoppingListModel,
};
pub use shopping_list_item::{
    Column as ShoppingListItemColumn, Entity as ShoppingListItem, ItemPriority,
    Model as ShoppingListItemModel,
};
