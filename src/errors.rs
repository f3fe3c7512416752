//! Unified error type for `PantryBuddy`.
//!
//! Every fallible operation in the crate returns [`Result`]. Variants fall into the
//! four families described by [`ErrorKind`], which drives how a failure is reported
//! back to the person who triggered it.

use thiserror::Error;

/// All errors produced by the core, configuration, and bot layers.
#[derive(Debug, Error)]
pub enum Error {
    /// Input rejected before reaching the store (missing name, bad lead time, ...)
    #[error("Validation error: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// A price or estimated amount that is negative or not a finite number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// Configuration file or environment problem
    #[error("Configuration error: {message}")]
    Config {
        /// Description of the configuration problem
        message: String,
    },

    /// The store rejected or failed the operation
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Product does not exist or is not visible to the caller
    #[error("Product not found: {id}")]
    ProductNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// Category does not exist or belongs to another user
    #[error("Category not found: {name}")]
    CategoryNotFound {
        /// Name or identifier that was looked up
        name: String,
    },

    /// Category still referenced by products
    #[error("Category '{name}' is still used by {product_count} product(s)")]
    CategoryInUse {
        /// Category name
        name: String,
        /// Number of products referencing the category
        product_count: u64,
    },

    /// A category with the same name already exists for this user
    #[error("Category '{name}' already exists")]
    CategoryExists {
        /// Duplicate name
        name: String,
    },

    /// Notification does not exist (already deleted or never existed)
    #[error("Notification not found: {id}")]
    NotificationNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// Shopping list or list item does not exist
    #[error("Shopping list entry not found: {id}")]
    ShoppingListNotFound {
        /// Identifier that was looked up
        id: i64,
    },

    /// No consumed or expired products to build a restock list from
    #[error("No products need replenishing")]
    NothingToRestock,

    /// Family does not exist or the user is not a member
    #[error("Family not found for user {user_id}")]
    FamilyNotFound {
        /// User whose family was looked up
        user_id: String,
    },

    /// The user already belongs to a family
    #[error("User {user_id} is already a member of a family")]
    AlreadyInFamily {
        /// User attempting to join or create a family
        user_id: String,
    },

    /// Only owners and admins may invite
    #[error("User {user_id} is not allowed to manage this family")]
    NotFamilyManager {
        /// User who attempted the action
        user_id: String,
    },

    /// Invitation token unknown, already used, or expired
    #[error("Invitation not found or has expired")]
    InvitationUnavailable,

    /// Email collaborator could not send a message
    #[error("Email dispatch failed: {message}")]
    EmailDispatch {
        /// Reason reported by the dispatcher
        message: String,
    },

    /// Environment variable missing or malformed
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting into a `String` failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Discord framework error
    #[error("Serenity/Poise framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Coarse classification used to decide how an error is surfaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Bad input; shown verbatim so the user can correct it
    Validation,
    /// Store or network failure; shown as a generic retryable message
    Store,
    /// Stale reference; the caller should refresh
    NotFound,
    /// Misconfiguration of the process
    Config,
    /// Failure in the chat surface itself
    Surface,
}

impl Error {
    /// Returns the error family.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. }
            | Self::InvalidAmount { .. }
            | Self::CategoryInUse { .. }
            | Self::CategoryExists { .. }
            | Self::NothingToRestock
            | Self::AlreadyInFamily { .. }
            | Self::NotFamilyManager { .. } => ErrorKind::Validation,
            Self::Database(_) | Self::EmailDispatch { .. } => ErrorKind::Store,
            Self::ProductNotFound { .. }
            | Self::CategoryNotFound { .. }
            | Self::NotificationNotFound { .. }
            | Self::ShoppingListNotFound { .. }
            | Self::FamilyNotFound { .. }
            | Self::InvitationUnavailable => ErrorKind::NotFound,
            Self::Config { .. } | Self::EnvVar(_) => ErrorKind::Config,
            Self::Fmt(_) | Self::FrameworkError(_) => ErrorKind::Surface,
        }
    }

    /// Text suitable for showing to the person who triggered the operation.
    ///
    /// Validation and stale-reference errors carry actionable detail; store errors
    /// collapse into a retry hint so internal details never leak.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self.kind() {
            ErrorKind::Validation => self.to_string(),
            ErrorKind::NotFound => format!("{self}. Please refresh and try again."),
            ErrorKind::Store => "Something went wrong while saving. Please try again.".to_string(),
            ErrorKind::Config | ErrorKind::Surface => "An internal error occurred.".to_string(),
        }
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
