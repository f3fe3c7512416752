//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

use crate::{bot::BotData, errors::Error};

/// Category management commands
pub mod category;

/// Family sharing commands
pub mod family;

/// General utility commands
pub mod general;

/// Timeline, analytics, and dashboard commands
pub mod insights;

/// Notification feed commands
pub mod notification;

/// Product management commands
pub mod product;

/// Reminder settings commands
pub mod settings;

/// Shopping list commands
pub mod shopping;

// Export commands
pub use category::*;
pub use family::*;
pub use general::*;
pub use insights::*;
pub use notification::*;
pub use product::*;
pub use settings::*;
pub use shopping::*;

/// Every top-level command registered with Discord.
#[must_use]
pub fn all() -> Vec<poise::Command<BotData, Error>> {
    vec![
        general::ping(),
        general::help(),
        product::product(),
        category::category(),
        notification::notifications(),
        notification::update(),
        insights::timeline(),
        insights::analytics(),
        insights::dashboard(),
        settings::settings(),
        family::family(),
        shopping::shopping(),
    ]
}
