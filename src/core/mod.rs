//! Core business logic, independent of the Discord surface.
//!
//! Every operation takes a `&DatabaseConnection` (plus explicit inputs such as the
//! acting user and `today`) and returns [`crate::errors::Result`].

pub mod analytics;
pub mod category;
pub mod email;
pub mod events;
pub mod family;
pub mod notification;
pub mod product;
pub mod reminder;
pub mod settings;
pub mod shopping;
pub mod status;
