//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    ///
    /// This is a simple health check command that doesn't require any database operations.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**PantryBuddy Help**\n\
        Track household items and get reminded before they expire.\n\n\
        **Inventory**\n\
        • `/product add <name> [expiry] [warranty] ...` - Track a product (YYYY-MM-DD).\n\
        • `/product edit|list|info|consume|delete` - Manage tracked products.\n\
        • `/category add|list|delete` - Organise products.\n\n\
        **Reminders & Notifications**\n\
        • `/notifications list|read|readall|delete|test|watch`\n\
        • `/settings show|set` - Reminder lead times and delivery preferences.\n\
        • `/update` - Turns due reminders into notifications.\n\n\
        **Insights**\n\
        • `/timeline [filter]` - Upcoming expiry and warranty dates.\n\
        • `/analytics [window]` - Spending, categories, and waste.\n\
        • `/dashboard` - Headline counters.\n\n\
        **Sharing & Shopping**\n\
        • `/family create|invite|join|leave|members`\n\
        • `/shopping lists|new|show|add|done|restock|delete`\n\n\
        **Utility**\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
