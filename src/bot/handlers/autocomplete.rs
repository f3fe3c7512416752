//! Autocomplete handlers for Discord slash command parameters.
//!
//! Suggestions are scoped to what the invoking user can see.

use crate::{
    bot::BotData,
    core::{category, product},
    errors::Error,
};

/// Discord caps autocomplete responses at 25 entries.
const MAX_SUGGESTIONS: usize = 25;

/// Provides autocomplete suggestions for product names.
///
/// Only products that are still in use (not consumed) are suggested.
pub async fn autocomplete_product_name(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let user_id = ctx.author().id.to_string();

    let Ok(products) = product::find_products_by_name(db, &user_id, partial).await else {
        return Vec::new();
    };

    let mut matching: Vec<String> = products
        .into_iter()
        .filter(|p| !p.is_consumed)
        .map(|p| p.name)
        .collect();
    matching.sort();
    matching.dedup();
    matching.truncate(MAX_SUGGESTIONS);
    matching
}

/// Provides autocomplete suggestions for the user's category names.
pub async fn autocomplete_category(
    ctx: poise::Context<'_, BotData, Error>,
    partial: &str,
) -> Vec<String> {
    let db = &ctx.data().database;
    let user_id = ctx.author().id.to_string();

    let Ok(categories) = category::get_user_categories(db, &user_id).await else {
        return Vec::new();
    };

    let partial_lower = partial.to_lowercase();
    categories
        .into_iter()
        .filter(|c| c.name.to_lowercase().contains(&partial_lower))
        .map(|c| c.name)
        .take(MAX_SUGGESTIONS)
        .collect()
}
