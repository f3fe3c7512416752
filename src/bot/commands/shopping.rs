//! Shopping list Discord commands - `/shopping ...`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{
            shopping::{self, ItemInput, ListWithItems},
            status,
        },
        entities::ItemPriority,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Item priority choices
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum PriorityChoice {
        #[name = "low"]
        Low,
        #[name = "medium"]
        Medium,
        #[name = "high"]
        High,
    }

    impl From<PriorityChoice> for ItemPriority {
        fn from(choice: PriorityChoice) -> Self {
            match choice {
                PriorityChoice::Low => Self::Low,
                PriorityChoice::Medium => Self::Medium,
                PriorityChoice::High => Self::High,
            }
        }
    }

    fn list_embed(loaded: &ListWithItems) -> Result<serenity::CreateEmbed> {
        let mut text = String::new();
        for item in &loaded.items {
            let check = if item.is_completed { "✅" } else { "⬜" };
            let priority = match item.priority {
                ItemPriority::High => " ❗",
                ItemPriority::Medium | ItemPriority::Low => "",
            };
            write!(
                text,
                "{check} `#{}` {} × {}{priority}",
                item.id, item.quantity, item.product_name
            )?;
            if let Some(price) = item.estimated_price {
                write!(text, " (~${price:.2})")?;
            }
            text.push('\n');
        }
        if text.is_empty() {
            text.push_str("This list is empty.");
        }

        Ok(serenity::CreateEmbed::default()
            .title(format!("🛒 {}", loaded.list.name))
            .description(text)
            .color(0x0022_C55E)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "List #{} · {} open · est. ${:.2}",
                loaded.list.id,
                loaded.open_items(),
                loaded.estimated_total()
            ))))
    }

    /// Parent command for shopping lists.
    #[poise::command(
        slash_command,
        subcommands(
            "shopping_lists",
            "shopping_new",
            "shopping_show",
            "shopping_add",
            "shopping_done",
            "shopping_restock",
            "shopping_delete"
        )
    )]
    pub async fn shopping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Shopping command. Available subcommands:\n\
            `/shopping lists` - Your lists\n\
            `/shopping new` - Create a list\n\
            `/shopping show` - Show a list\n\
            `/shopping add` - Add an item\n\
            `/shopping done` - Tick an item off\n\
            `/shopping restock` - Build a list from consumed and expired products\n\
            `/shopping delete` - Delete a list",
        )
        .await?;
        Ok(())
    }

    /// Lists your shopping lists.
    #[poise::command(slash_command, rename = "lists")]
    pub async fn shopping_lists(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let lists = shopping::get_user_lists(&ctx.data().database, &user_id).await?;
        if lists.is_empty() {
            ctx.say("No shopping lists yet. Use `/shopping new` or `/shopping restock`.")
                .await?;
            return Ok(());
        }
        let mut text = String::new();
        for list in &lists {
            writeln!(
                text,
                "`#{}` {}{}",
                list.id,
                list.name,
                if list.is_completed { " ✅" } else { "" }
            )?;
        }
        ctx.say(text).await?;
        Ok(())
    }

    /// Creates a shopping list.
    #[poise::command(slash_command, rename = "new")]
    pub async fn shopping_new(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "List name"] name: String,
        #[description = "Description"] description: Option<String>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let list = shopping::create_list(&ctx.data().database, &user_id, &name, description).await?;
        ctx.say(format!("🛒 List '{}' created as `#{}`.", list.name, list.id))
            .await?;
        Ok(())
    }

    /// Shows a list and its items.
    #[poise::command(slash_command, rename = "show")]
    pub async fn shopping_show(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "List number"] list: i64,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let loaded = shopping::get_list(&ctx.data().database, &user_id, list).await?;
        ctx.send(poise::CreateReply::default().embed(list_embed(&loaded)?))
            .await?;
        Ok(())
    }

    /// Adds an item to a list.
    #[poise::command(slash_command, rename = "add")]
    pub async fn shopping_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "List number"] list: i64,
        #[description = "What to buy"] item: String,
        #[description = "How many (default 1)"] quantity: Option<i32>,
        #[description = "Priority (default medium)"] priority: Option<PriorityChoice>,
        #[description = "Expected price"] price: Option<f64>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let input = ItemInput {
            quantity: quantity.unwrap_or(1),
            priority: priority.map_or(ItemPriority::Medium, ItemPriority::from),
            estimated_price: price,
            ..ItemInput::named(&item)
        };
        let added = shopping::add_item(&ctx.data().database, &user_id, list, input).await?;
        ctx.say(format!(
            "✅ Added {} × {} as `#{}`.",
            added.quantity, added.product_name, added.id
        ))
        .await?;
        Ok(())
    }

    /// Ticks an item off (or back on).
    #[poise::command(slash_command, rename = "done")]
    pub async fn shopping_done(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Item number"] item: i64,
        #[description = "Set to false to reopen"] done: Option<bool>,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let updated = shopping::set_item_completed(
            &ctx.data().database,
            &user_id,
            item,
            done.unwrap_or(true),
        )
        .await?;
        ctx.say(format!(
            "{} {}",
            if updated.is_completed { "✅" } else { "⬜" },
            updated.product_name
        ))
        .await?;
        Ok(())
    }

    /// Builds a restock list from consumed and expired products.
    #[poise::command(slash_command, rename = "restock")]
    pub async fn shopping_restock(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let generated =
            shopping::generate_restock_list(&ctx.data().database, &user_id, status::today()).await?;
        ctx.send(poise::CreateReply::default().embed(list_embed(&generated)?))
            .await?;
        Ok(())
    }

    /// Deletes a list and its items.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn shopping_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "List number"] list: i64,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        shopping::delete_list(&ctx.data().database, &user_id, list).await?;
        ctx.say(format!("🗑️ List `#{list}` deleted.")).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
