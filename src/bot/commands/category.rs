//! Category Discord commands - `/category add|list|delete`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::category::{self, CategoryInput},
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for product categories.
    #[poise::command(
        slash_command,
        subcommands("category_add", "category_list", "category_delete")
    )]
    pub async fn category(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Category command. Available subcommands:\n\
            `/category add` - Create a category\n\
            `/category list` - List your categories\n\
            `/category delete` - Delete an unused category",
        )
        .await?;
        Ok(())
    }

    /// Creates a category.
    #[poise::command(slash_command, rename = "add")]
    pub async fn category_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category name (e.g., 'Medicine')"] name: String,
        #[description = "Icon or emoji"] icon: Option<String>,
        #[description = "Color, e.g. #22c55e"] color: Option<String>,
        #[description = "Description"] description: Option<String>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let created = category::create_category(
            &ctx.data().database,
            &user_id,
            CategoryInput {
                name,
                icon,
                color,
                description,
            },
        )
        .await?;
        ctx.say(format!("✅ Category '{}' created.", created.name))
            .await?;
        Ok(())
    }

    /// Lists your categories.
    #[poise::command(slash_command, rename = "list")]
    pub async fn category_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let categories = category::get_user_categories(&ctx.data().database, &user_id).await?;
        if categories.is_empty() {
            ctx.say("No categories yet. Use `/category add` to create one!")
                .await?;
            return Ok(());
        }

        let mut text = String::from("**Your Categories**\n");
        for cat in &categories {
            writeln!(
                text,
                "{} {}{}",
                cat.icon.as_deref().unwrap_or("•"),
                cat.name,
                cat.description
                    .as_deref()
                    .map(|d| format!(" - {d}"))
                    .unwrap_or_default()
            )?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Deletes a category no product uses.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn category_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Category to delete"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        name: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        category::delete_category(&ctx.data().database, &user_id, &name).await?;
        ctx.say(format!("✅ Category '{name}' deleted.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
