//! Notification Discord commands - the feed and the reminder promotion run.
//!
//! Each invocation loads a fresh [`NotificationFeed`] for the caller, applies the
//! action through it, and reports the resulting unread count.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{notification::NotificationFeed, reminder, status},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::time::Duration;

    /// Longest `/notifications watch` waits for a change.
    const WATCH_TIMEOUT: Duration = Duration::from_secs(120);

    async fn load_feed(ctx: poise::Context<'_, BotData, Error>) -> Result<NotificationFeed> {
        let data = ctx.data();
        let mut feed = NotificationFeed::new(&ctx.author().id.to_string(), data.config.feed_limit);
        feed.refresh(&data.database).await?;
        Ok(feed)
    }

    fn feed_embed(feed: &NotificationFeed) -> serenity::CreateEmbed {
        let fields: Vec<_> = feed
            .notifications()
            .iter()
            .take(25)
            .map(|n| {
                let marker = if n.is_read { "" } else { "🔵 " };
                (
                    format!("{marker}#{} {}", n.id, n.title),
                    format!("{}\n_{}_", n.message, n.created_at.format("%Y-%m-%d %H:%M")),
                    false,
                )
            })
            .collect();

        serenity::CreateEmbed::default()
            .title("🔔 Notifications")
            .description(format!("{} unread", feed.unread_count()))
            .color(0x0034_98DB)
            .fields(fields)
    }

    /// Parent command for the notification feed.
    #[poise::command(
        slash_command,
        subcommands(
            "notifications_list",
            "notifications_read",
            "notifications_read_all",
            "notifications_delete",
            "notifications_test",
            "notifications_watch"
        )
    )]
    pub async fn notifications(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Notification command. Available subcommands:\n\
            `/notifications list` - Show your latest notifications\n\
            `/notifications read` - Mark one as read\n\
            `/notifications readall` - Mark all as read\n\
            `/notifications delete` - Delete one\n\
            `/notifications test` - Send yourself a test notification\n\
            `/notifications watch` - Wait for the next change",
        )
        .await?;
        Ok(())
    }

    /// Shows your latest notifications.
    #[poise::command(slash_command, rename = "list")]
    pub async fn notifications_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let feed = load_feed(ctx).await?;
        if feed.notifications().is_empty() {
            ctx.say("📭 No notifications.").await?;
            return Ok(());
        }
        ctx.send(poise::CreateReply::default().embed(feed_embed(&feed)))
            .await?;
        Ok(())
    }

    /// Marks one notification as read.
    #[poise::command(slash_command, rename = "read")]
    pub async fn notifications_read(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Notification number (see /notifications list)"] id: i64,
    ) -> Result<()> {
        let mut feed = load_feed(ctx).await?;
        let data = ctx.data();
        feed.mark_as_read(&data.database, &data.events, id).await?;
        ctx.say(format!("✅ Marked as read. {} unread left.", feed.unread_count()))
            .await?;
        Ok(())
    }

    /// Marks all notifications as read.
    #[poise::command(slash_command, rename = "readall")]
    pub async fn notifications_read_all(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let mut feed = load_feed(ctx).await?;
        let data = ctx.data();
        let changed = feed.mark_all_as_read(&data.database, &data.events).await?;
        ctx.say(format!(
            "✅ Marked {changed} notification{} as read.",
            if changed == 1 { "" } else { "s" }
        ))
        .await?;
        Ok(())
    }

    /// Deletes one notification.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn notifications_delete(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Notification number (see /notifications list)"] id: i64,
    ) -> Result<()> {
        let mut feed = load_feed(ctx).await?;
        let data = ctx.data();
        feed.delete(&data.database, &data.events, id).await?;
        ctx.say(format!("🗑️ Deleted. {} unread left.", feed.unread_count()))
            .await?;
        Ok(())
    }

    /// Sends you a test notification.
    #[poise::command(slash_command, rename = "test")]
    pub async fn notifications_test(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let mut feed = load_feed(ctx).await?;
        let data = ctx.data();
        feed.generate_test(&data.database, &data.events).await?;
        ctx.send(poise::CreateReply::default().embed(feed_embed(&feed)))
            .await?;
        Ok(())
    }

    /// Waits for the next change to your notifications and shows the refreshed feed.
    #[poise::command(slash_command, rename = "watch")]
    pub async fn notifications_watch(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let mut subscription = data.events.subscribe(&user_id);
        let mut feed = load_feed(ctx).await?;

        ctx.say(format!(
            "👀 Watching for changes ({} unread now)...",
            feed.unread_count()
        ))
        .await?;

        let waited =
            tokio::time::timeout(WATCH_TIMEOUT, feed.sync(&data.database, &mut subscription)).await;
        match waited {
            Ok(Ok(true)) => {
                ctx.send(poise::CreateReply::default().embed(feed_embed(&feed)))
                    .await?;
            }
            Ok(Ok(false)) => {
                ctx.say("Notification stream closed.").await?;
            }
            Ok(Err(e)) => return Err(e),
            Err(_) => {
                ctx.say("No changes in the last two minutes.").await?;
            }
        }
        Ok(())
    }

    /// Turns due reminders into notifications for everyone.
    ///
    /// The same run also happens periodically in the background; running it twice
    /// on one day creates nothing new.
    #[poise::command(slash_command, prefix_command)]
    pub async fn update(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let data = ctx.data();

        // Acknowledge command quickly
        ctx.defer().await?;

        let created =
            reminder::promote_due_reminders(&data.database, &data.events, status::today()).await?;
        if created.is_empty() {
            ctx.say("ℹ️ No reminders are due. Nothing to do.").await?;
        } else {
            ctx.say(format!(
                "✅ **Reminder run complete!** Created {} notification{}.",
                created.len(),
                if created.len() == 1 { "" } else { "s" }
            ))
            .await?;
        }
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
