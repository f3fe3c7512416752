//! Settings Discord commands - `/settings show|set`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::settings::{self, SettingsUpdate},
        entities::notification_settings,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;

    fn settings_embed(current: &notification_settings::Model) -> serenity::CreateEmbed {
        let flag = |on: bool| if on { "on" } else { "off" };
        serenity::CreateEmbed::default()
            .title("⚙️ Reminder Settings")
            .color(0x0034_98DB)
            .field(
                "Expiry reminders",
                format!("{} days before", current.expiry_reminder_days),
                true,
            )
            .field(
                "Warranty reminders",
                format!("{} days before", current.warranty_reminder_days),
                true,
            )
            .field(
                "Delivery",
                format!(
                    "Email: {} · Push: {} · Daily digest: {}",
                    flag(current.email_notifications),
                    flag(current.push_notifications),
                    flag(current.daily_digest)
                ),
                false,
            )
            .footer(serenity::CreateEmbedFooter::new(
                "New lead times apply to products saved from now on",
            ))
    }

    /// Parent command for reminder settings.
    #[poise::command(slash_command, subcommands("settings_show", "settings_set"))]
    pub async fn settings(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Settings command. Available subcommands:\n\
            `/settings show` - Show your settings\n\
            `/settings set` - Change lead times or delivery preferences",
        )
        .await?;
        Ok(())
    }

    /// Shows your reminder settings.
    #[poise::command(slash_command, rename = "show")]
    pub async fn settings_show(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let current =
            settings::get_or_create_settings(&data.database, &user_id, data.default_lead_times())
                .await?;
        ctx.send(poise::CreateReply::default().embed(settings_embed(&current)))
            .await?;
        Ok(())
    }

    /// Changes your reminder settings. Omitted options stay as they are.
    #[poise::command(slash_command, rename = "set")]
    pub async fn settings_set(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Days before expiry to remind you"] expiry_days: Option<i32>,
        #[description = "Days before warranty end to remind you"] warranty_days: Option<i32>,
        #[description = "Email notifications"] email: Option<bool>,
        #[description = "Push notifications"] push: Option<bool>,
        #[description = "Daily digest"] digest: Option<bool>,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        settings::get_or_create_settings(&data.database, &user_id, data.default_lead_times())
            .await?;

        let updated = settings::update_settings(
            &data.database,
            &user_id,
            SettingsUpdate {
                expiry_reminder_days: expiry_days,
                warranty_reminder_days: warranty_days,
                email_notifications: email,
                push_notifications: push,
                daily_digest: digest,
            },
        )
        .await?;
        ctx.send(poise::CreateReply::default().embed(settings_embed(&updated)))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
