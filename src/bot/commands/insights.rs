//! Insight Discord commands - `/timeline`, `/analytics`, and `/dashboard`.
//!
//! All three load the caller's visible products once and hand them to the pure
//! projections in [`crate::core::analytics`].

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{
            analytics::{self, AnalyticsWindow, TimelineFilter},
            category, product,
            status::{self, Status},
        },
        entities::ReminderType,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    /// Timeline filter choices
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum TimelineChoice {
        #[name = "all"]
        All,
        #[name = "expiry"]
        Expiry,
        #[name = "warranty"]
        Warranty,
    }

    impl From<TimelineChoice> for TimelineFilter {
        fn from(choice: TimelineChoice) -> Self {
            match choice {
                TimelineChoice::All => Self::All,
                TimelineChoice::Expiry => Self::Expiry,
                TimelineChoice::Warranty => Self::Warranty,
            }
        }
    }

    /// Analytics window choices
    #[derive(Debug, Clone, Copy, poise::ChoiceParameter)]
    pub enum WindowChoice {
        #[name = "6 months"]
        SixMonths,
        #[name = "12 months"]
        TwelveMonths,
    }

    impl From<WindowChoice> for AnalyticsWindow {
        fn from(choice: WindowChoice) -> Self {
            match choice {
                WindowChoice::SixMonths => Self::SixMonths,
                WindowChoice::TwelveMonths => Self::TwelveMonths,
            }
        }
    }

    const fn status_emoji(state: Status) -> &'static str {
        match state {
            Status::Expired { .. } => "⛔",
            Status::Critical => "🔴",
            Status::Warning => "🟡",
            Status::Good => "🟢",
        }
    }

    /// Shows upcoming expiry and warranty dates, soonest first.
    #[poise::command(slash_command, prefix_command)]
    pub async fn timeline(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Which dates to show"] filter: Option<TimelineChoice>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let products = product::get_visible_products(db, &user_id).await?;
        let filter = filter.map_or(TimelineFilter::All, TimelineFilter::from);

        let entries = analytics::build_timeline(&products, status::today(), filter);
        if entries.is_empty() {
            ctx.say("📅 Nothing on the timeline.").await?;
            return Ok(());
        }

        let mut text = String::new();
        for entry in entries.iter().take(30) {
            let kind = match entry.kind {
                ReminderType::Expiry => "expires",
                ReminderType::Warranty => "warranty ends",
            };
            writeln!(
                text,
                "{} `{}` **{}** {kind} ({})",
                status_emoji(entry.status),
                entry.date,
                entry.product_name,
                entry.status
            )?;
        }
        if entries.len() > 30 {
            writeln!(text, "...and {} more", entries.len() - 30)?;
        }

        let embed = serenity::CreateEmbed::default()
            .title("📅 Timeline")
            .description(text)
            .color(0x0034_98DB);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows spending, category, and waste analytics.
    #[poise::command(slash_command, prefix_command)]
    pub async fn analytics(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Time window"] window: Option<WindowChoice>,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let products = product::get_visible_products(db, &user_id).await?;
        let categories = category::get_categories_for_products(db, &products).await?;
        let window = window.map_or(AnalyticsWindow::SixMonths, AnalyticsWindow::from);
        let today = status::today();

        let trend = analytics::spending_trend(&products, today, window);
        let breakdown = analytics::category_breakdown(&products, &categories, today, window);
        let waste = analytics::waste_summary(&products, today, window);

        let total: f64 = trend.iter().map(|m| m.amount).sum();
        let mut trend_text = String::new();
        for month in &trend {
            writeln!(
                trend_text,
                "`{}` ${:.2} ({} item{})",
                month.month.format("%b %Y"),
                month.amount,
                month.count,
                if month.count == 1 { "" } else { "s" }
            )?;
        }

        let mut category_text = String::new();
        for cat in breakdown.iter().take(10) {
            writeln!(category_text, "**{}** ${:.2} ({})", cat.name, cat.spending, cat.count)?;
        }
        if category_text.is_empty() {
            category_text.push_str("No products in this window");
        }

        let embed = serenity::CreateEmbed::default()
            .title(format!("📈 Analytics - last {} months", window.months()))
            .color(0x0034_98DB)
            .field("Total spending", format!("${total:.2}"), true)
            .field(
                "Avg per month",
                format!("${:.2}", total / f64::from(window.months())),
                true,
            )
            .field(
                "Waste rate",
                format!("{:.1}% ({} expired)", waste.waste_rate * 100.0, waste.expired),
                true,
            )
            .field("Spending trend", trend_text, false)
            .field("By category", category_text, false)
            .field(
                "Usage",
                format!(
                    "Active: {} · Consumed: {} · Expired: {}",
                    waste.active, waste.consumed, waste.expired
                ),
                false,
            );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows headline counters for your inventory.
    #[poise::command(slash_command, prefix_command)]
    pub async fn dashboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let products = product::get_visible_products(db, &user_id).await?;
        let categories = category::get_categories_for_products(db, &products).await?;

        let stats = analytics::dashboard_stats(&products, &categories, status::today());

        let mut per_category = String::new();
        for (name, count) in &stats.per_category {
            writeln!(per_category, "{name}: {count}")?;
        }
        if per_category.is_empty() {
            per_category.push_str("No products yet");
        }

        let embed = serenity::CreateEmbed::default()
            .title("🏠 Dashboard")
            .color(0x0022_C55E)
            .field("Products", stats.total_products.to_string(), true)
            .field(
                "Expiring soon",
                format!("{} (next {} days)", stats.expiring_soon, analytics::EXPIRING_SOON_DAYS),
                true,
            )
            .field("Warranties ending", stats.warranty_expiring.to_string(), true)
            .field("Expired", stats.expired.to_string(), true)
            .field("By category", per_category, false);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
