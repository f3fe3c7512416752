//! Product Discord commands - `/product add|list|info|consume|delete`.
//!
//! These commands are thin callers of [`crate::core::product`]; dates are typed as
//! `YYYY-MM-DD` and validated by the core before anything is stored.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, handlers::autocomplete},
        core::{
            category,
            product::{self, ProductInput},
            status,
        },
        entities::product as product_entity,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Parent command for tracking household products.
    #[poise::command(
        slash_command,
        subcommands(
            "product_add",
            "product_edit",
            "product_list",
            "product_info",
            "product_consume",
            "product_delete"
        )
    )]
    pub async fn product(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Product command. Available subcommands:\n\
            `/product add` - Track a new product\n\
            `/product edit` - Change a product's dates or details\n\
            `/product list` - List your products\n\
            `/product info` - Show one product with its reminders\n\
            `/product consume` - Mark a product as used up\n\
            `/product delete` - Stop tracking a product";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Resolves a product name typed by the user to a single visible product.
    ///
    /// An exact (case-insensitive) match wins; otherwise the name must match exactly
    /// one product partially. Replies to the user and returns `None` when it doesn't.
    async fn resolve_product(
        ctx: poise::Context<'_, BotData, Error>,
        name: &str,
    ) -> Result<Option<product_entity::Model>> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let mut candidates = product::find_products_by_name(db, &user_id, name).await?;

        if let Some(pos) = candidates
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(name.trim()))
        {
            return Ok(Some(candidates.swap_remove(pos)));
        }
        match candidates.len() {
            0 => {
                ctx.say(format!("❌ Product '{name}' not found.")).await?;
                Ok(None)
            }
            1 => Ok(candidates.pop()),
            n => {
                ctx.say(format!(
                    "⚠️ '{name}' matches {n} products. Please use the full name."
                ))
                .await?;
                Ok(None)
            }
        }
    }

    fn parse_optional_date(
        field: &str,
        value: Option<&String>,
    ) -> Result<Option<chrono::NaiveDate>> {
        value.map(|v| product::parse_date(field, v)).transpose()
    }

    /// Adds a product and schedules its reminders.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "add")]
    pub async fn product_add(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name (e.g., 'Milk')"] name: String,
        #[description = "Expiry date, YYYY-MM-DD"] expiry: Option<String>,
        #[description = "Warranty end date, YYYY-MM-DD"] warranty: Option<String>,
        #[description = "Purchase date, YYYY-MM-DD"] purchased: Option<String>,
        #[description = "Price paid"] price: Option<f64>,
        #[description = "Brand"] brand: Option<String>,
        #[description = "Category"]
        #[autocomplete = "autocomplete::autocomplete_category"]
        category_name: Option<String>,
        #[description = "Store it was bought at"] store: Option<String>,
        #[description = "Share with your family"] share: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let db = &data.database;
        let user_id = ctx.author().id.to_string();

        let category_id = match category_name {
            Some(ref cat) => Some(category::get_category_by_name(db, &user_id, cat).await?.id),
            None => None,
        };
        let input = ProductInput {
            name,
            brand,
            category_id,
            purchase_date: parse_optional_date("Purchase date", purchased.as_ref())?,
            expiry_date: parse_optional_date("Expiry date", expiry.as_ref())?,
            warranty_date: parse_optional_date("Warranty date", warranty.as_ref())?,
            price,
            store_name: store,
            share_with_family: share.unwrap_or(false),
            ..Default::default()
        };

        let saved = product::create_product(db, &user_id, input, data.default_lead_times()).await?;

        let mut message = format!("✅ Now tracking **{}**.", saved.product.name);
        for reminder in &saved.reminders {
            write!(
                message,
                "\n🔔 {:?} reminder on {}",
                reminder.reminder_type, reminder.reminder_date
            )?;
        }
        if let Some(warning) = saved.reminder_warning {
            write!(message, "\n⚠️ {warning}")?;
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Changes a product. Omitted options keep their current value.
    #[allow(clippy::too_many_arguments)]
    #[poise::command(slash_command, rename = "edit")]
    pub async fn product_edit(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product to change"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
        #[description = "New name"] new_name: Option<String>,
        #[description = "Expiry date, YYYY-MM-DD"] expiry: Option<String>,
        #[description = "Warranty end date, YYYY-MM-DD"] warranty: Option<String>,
        #[description = "Price paid"] price: Option<f64>,
        #[description = "Notes"] notes: Option<String>,
        #[description = "Share with your family"] share: Option<bool>,
    ) -> Result<()> {
        let Some(existing) = resolve_product(ctx, &name).await? else {
            return Ok(());
        };
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();

        let input = ProductInput {
            name: new_name.unwrap_or_else(|| existing.name.clone()),
            brand: existing.brand.clone(),
            category_id: existing.category_id,
            batch_number: existing.batch_number.clone(),
            purchase_date: existing.purchase_date,
            expiry_date: parse_optional_date("Expiry date", expiry.as_ref())?
                .or(existing.expiry_date),
            warranty_date: parse_optional_date("Warranty date", warranty.as_ref())?
                .or(existing.warranty_date),
            price: price.or(existing.price),
            store_name: existing.store_name.clone(),
            barcode: existing.barcode.clone(),
            notes: notes.or_else(|| existing.notes.clone()),
            share_with_family: share.unwrap_or(existing.family_id.is_some()),
        };

        let saved = product::update_product(
            &data.database,
            &user_id,
            existing.id,
            input,
            data.default_lead_times(),
        )
        .await?;

        let mut message = format!("✅ Updated **{}**.", saved.product.name);
        if let Some(warning) = saved.reminder_warning {
            write!(message, "\n⚠️ {warning}")?;
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Lists products you can see, with their expiry status.
    #[poise::command(slash_command, rename = "list")]
    pub async fn product_list(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Include consumed products"] include_consumed: Option<bool>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let today = status::today();

        let products: Vec<_> = product::get_visible_products(db, &user_id)
            .await?
            .into_iter()
            .filter(|p| include_consumed.unwrap_or(false) || !p.is_consumed)
            .collect();

        if products.is_empty() {
            ctx.say("No products tracked yet. Use `/product add` to start!")
                .await?;
            return Ok(());
        }

        let mut embed_fields = Vec::new();
        for prod in products.iter().take(25) {
            let mut value = String::new();
            match status::classify(prod.expiry_date, today) {
                Some(state) => write!(value, "Expiry: {state}")?,
                None => write!(value, "No expiry date")?,
            }
            if let Some(state) = status::classify(prod.warranty_date, today) {
                write!(value, "\nWarranty: {state}")?;
            }
            if prod.is_consumed {
                write!(value, "\n✔️ Consumed")?;
            }
            embed_fields.push((prod.name.clone(), value, true));
        }

        let list_embed = serenity::CreateEmbed::default()
            .title("**Your Products**")
            .color(0x0022_C55E)
            .fields(embed_fields)
            .footer(serenity::CreateEmbedFooter::new(format!(
                "{} product{}",
                products.len(),
                if products.len() == 1 { "" } else { "s" }
            )));

        ctx.send(poise::CreateReply::default().embed(list_embed))
            .await?;
        Ok(())
    }

    /// Shows one product with its scheduled reminders.
    #[poise::command(slash_command, rename = "info")]
    pub async fn product_info(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let Some(prod) = resolve_product(ctx, &name).await? else {
            return Ok(());
        };
        let db = &ctx.data().database;
        let today = status::today();
        let reminders = crate::core::reminder::get_reminders_for_product(db, prod.id).await?;

        let mut embed = serenity::CreateEmbed::default()
            .title(prod.name.clone())
            .color(0x0022_C55E);
        if let Some(brand) = &prod.brand {
            embed = embed.field("Brand", brand, true);
        }
        if let Some(price) = prod.price {
            embed = embed.field("Price", format!("${price:.2}"), true);
        }
        let expiry_state = status::classify(prod.expiry_date, today);
        if let (Some(date), Some(state)) = (prod.expiry_date, expiry_state) {
            embed = embed.field("Expiry", format!("{date} ({state})"), false);
        }
        if let (Some(date), Some(state)) =
            (prod.warranty_date, status::classify(prod.warranty_date, today))
        {
            embed = embed.field("Warranty", format!("{date} ({state})"), false);
        }

        let mut reminder_text = String::new();
        for reminder in &reminders {
            writeln!(
                reminder_text,
                "{:?} on {}{}",
                reminder.reminder_type,
                reminder.reminder_date,
                if reminder.is_sent { " (sent)" } else { "" }
            )?;
        }
        if reminder_text.is_empty() {
            reminder_text.push_str("None");
        }
        embed = embed.field("Reminders", reminder_text, false);

        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Marks a product as used up.
    #[poise::command(slash_command, rename = "consume")]
    pub async fn product_consume(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let Some(prod) = resolve_product(ctx, &name).await? else {
            return Ok(());
        };
        let user_id = ctx.author().id.to_string();
        product::mark_consumed(&ctx.data().database, &user_id, &[prod.id]).await?;
        ctx.say(format!("✅ '{}' marked as consumed.", prod.name))
            .await?;
        Ok(())
    }

    /// Stops tracking a product and removes its reminders.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn product_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Product name"]
        #[autocomplete = "autocomplete::autocomplete_product_name"]
        name: String,
    ) -> Result<()> {
        let Some(prod) = resolve_product(ctx, &name).await? else {
            return Ok(());
        };
        let user_id = ctx.author().id.to_string();
        product::delete_products(&ctx.data().database, &user_id, &[prod.id]).await?;
        ctx.say(format!("✅ Product '{}' has been deleted.", prod.name))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
