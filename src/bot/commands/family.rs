//! Family Discord commands - `/family create|invite|join|leave|members`.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        core::{email::LogDispatcher, family},
        entities::FamilyRole,
        errors::{Error, Result},
    };
    use std::fmt::Write;

    /// Parent command for family sharing.
    #[poise::command(
        slash_command,
        subcommands(
            "family_create",
            "family_invite",
            "family_join",
            "family_leave",
            "family_members"
        )
    )]
    pub async fn family(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say(
            "Family command. Available subcommands:\n\
            `/family create` - Start a family and become its owner\n\
            `/family invite` - Invite someone by email\n\
            `/family join` - Join with an invitation token\n\
            `/family leave` - Leave your family\n\
            `/family members` - List members",
        )
        .await?;
        Ok(())
    }

    /// Creates a family with you as owner.
    #[poise::command(slash_command, rename = "create")]
    pub async fn family_create(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Family name"] name: String,
    ) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        let created = family::create_family(&ctx.data().database, &user_id, &name).await?;
        ctx.say(format!(
            "🏠 Family '{}' created. Invite others with `/family invite`.",
            created.name
        ))
        .await?;
        Ok(())
    }

    /// Invites someone to your family by email.
    #[poise::command(slash_command, rename = "invite", ephemeral)]
    pub async fn family_invite(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Email address to invite"] email: String,
    ) -> Result<()> {
        let data = ctx.data();
        let user_id = ctx.author().id.to_string();
        let outcome = family::invite_member(
            &data.database,
            &LogDispatcher,
            &user_id,
            &email,
            data.config.invitation_ttl_days,
            &data.config.invite_base_url,
        )
        .await?;

        let mut message = format!(
            "✉️ Invitation created for {}. Token: `{}`\nLink: {}\nExpires: {}",
            outcome.invitation.email,
            outcome.invitation.token,
            outcome.invitation_url,
            outcome.invitation.expires_at.format("%Y-%m-%d")
        );
        if let Some(warning) = outcome.dispatch_warning {
            write!(message, "\n⚠️ {warning}")?;
        }
        ctx.say(message).await?;
        Ok(())
    }

    /// Joins a family using an invitation token.
    #[poise::command(slash_command, rename = "join", ephemeral)]
    pub async fn family_join(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Invitation token"] token: String,
    ) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        family::accept_invitation(db, &token, &user_id).await?;
        let (joined, _) = family::get_family_for_user(db, &user_id).await?;
        ctx.say(format!("🎉 You joined '{}'.", joined.name)).await?;
        Ok(())
    }

    /// Leaves your family.
    #[poise::command(slash_command, rename = "leave")]
    pub async fn family_leave(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        family::leave_family(&ctx.data().database, &user_id).await?;
        ctx.say("👋 You left your family.").await?;
        Ok(())
    }

    /// Lists the members of your family.
    #[poise::command(slash_command, rename = "members")]
    pub async fn family_members(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let db = &ctx.data().database;
        let user_id = ctx.author().id.to_string();
        let (current, _) = family::get_family_for_user(db, &user_id).await?;
        let members = family::list_members(db, &user_id).await?;

        let mut text = format!("**{}**\n", current.name);
        for member in &members {
            let role = match member.role {
                FamilyRole::Owner => "👑 owner",
                FamilyRole::Admin => "🛡️ admin",
                FamilyRole::Member => "member",
            };
            writeln!(
                text,
                "<@{}> - {role} since {}",
                member.user_id,
                member.joined_at.format("%Y-%m-%d")
            )?;
        }
        ctx.say(text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
