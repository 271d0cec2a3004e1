//! Reminder Discord commands - `remind` and `reminders`.
//!
//! These commands are thin wrappers: parsing, persistence and scheduling all
//! happen in [`crate::core::reminders`].

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, checks},
        core::{duration::format_remaining, reminders},
        entities::Reminder,
        errors::{Error, Result},
    };
    use chrono::Utc;
    use poise::serenity_prelude as serenity;

    /// Discord caps embeds at 25 fields.
    const MAX_LISTED: usize = 25;

    async fn reply_embed(
        ctx: poise::Context<'_, BotData, Error>,
        embed: serenity::CreateEmbed,
        ephemeral: bool,
    ) -> Result<()> {
        ctx.send(
            poise::CreateReply::default()
                .embed(embed.color(ctx.data().config.embed_color))
                .ephemeral(ephemeral),
        )
        .await?;
        Ok(())
    }

    fn describe(reminder: &Reminder, now: i64) -> String {
        format!(
            "**Message:** {}\n**Duration:** {}\n**Time left:** {}\n**Ends:** <t:{}:R>",
            reminder.message,
            reminder.duration_text,
            format_remaining(reminder.remaining(now)),
            reminder.expires_at
        )
    }

    /// Sets a reminder (format: `remind 1d2h30m message`).
    ///
    /// Durations combine days, hours, minutes and seconds, e.g. `1d2h30m` or `1.5h`.
    /// The reminder is sent by DM, or in this channel if your DMs are closed.
    #[poise::command(
        prefix_command,
        slash_command,
        guild_only,
        check = "checks::can_remind"
    )]
    pub async fn remind(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "How long to wait, e.g. 1d2h30m"] duration: String,
        #[description = "What to remind you about"]
        #[rest]
        message: String,
    ) -> Result<()> {
        let data = ctx.data();
        let result = reminders::create_reminder(
            &data.store,
            &data.scheduler,
            ctx.author().id.get(),
            ctx.channel_id().get(),
            &duration,
            &message,
        )
        .await;

        let reminder = match result {
            Ok(reminder) => reminder,
            Err(e @ (Error::InvalidDuration { .. } | Error::EmptyMessage)) => {
                let embed = serenity::CreateEmbed::default().description(e.to_string());
                return reply_embed(ctx, embed, false).await;
            }
            Err(e) => return Err(e),
        };

        let embed = serenity::CreateEmbed::default().description(format!(
            "## ⏰ Reminder Successfully Set\n- **ends** <t:{}:R>",
            reminder.expires_at
        ));
        reply_embed(ctx, embed, false).await
    }

    /// View and manage your reminders.
    #[poise::command(
        prefix_command,
        slash_command,
        guild_only,
        subcommands("reminders_list", "reminders_cancel")
    )]
    pub async fn reminders(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "Reminder management command. Available subcommands:\n\
            `/reminders list` - Show your pending reminders\n\
            `/reminders cancel <number>` - Cancel a reminder by its number in the list";

        ctx.say(help_text).await?;
        Ok(())
    }

    /// Lists your pending reminders, soonest first.
    #[poise::command(
        prefix_command,
        slash_command,
        guild_only,
        rename = "list",
        check = "checks::can_remind"
    )]
    pub async fn reminders_list(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let pending =
            reminders::list_reminders_for(&ctx.data().store, ctx.author().id.get()).await;

        if pending.is_empty() {
            let embed =
                serenity::CreateEmbed::default().description("You have no active reminders!");
            return reply_embed(ctx, embed, true).await;
        }

        let now = Utc::now().timestamp();
        let total = pending.len();
        let fields = pending
            .iter()
            .take(MAX_LISTED)
            .enumerate()
            .map(|(i, reminder)| {
                (
                    format!("Reminder {}/{total}", i + 1),
                    describe(reminder, now),
                    false,
                )
            });

        let mut embed = serenity::CreateEmbed::default()
            .title("Your Active Reminders")
            .fields(fields);
        if total > MAX_LISTED {
            embed = embed.footer(serenity::CreateEmbedFooter::new(format!(
                "Showing the first {MAX_LISTED} of {total} reminders"
            )));
        }

        reply_embed(ctx, embed, true).await
    }

    /// Cancels one of your reminders by its number in `/reminders list`.
    #[poise::command(
        prefix_command,
        slash_command,
        guild_only,
        rename = "cancel",
        check = "checks::can_remind"
    )]
    pub async fn reminders_cancel(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Number shown in /reminders list"]
        #[min = 1]
        number: u32,
    ) -> Result<()> {
        let data = ctx.data();
        let index = usize::try_from(number).unwrap_or(usize::MAX);

        let embed = match reminders::cancel_reminder_at(
            &data.store,
            &data.scheduler,
            ctx.author().id.get(),
            index,
        )
        .await
        {
            Ok(reminder) => serenity::CreateEmbed::default()
                .title("Reminder removed")
                .description(format!("Removed reminder: {}", reminder.message)),
            Err(e @ Error::ReminderNotFound { .. }) => {
                serenity::CreateEmbed::default().description(e.to_string())
            }
            Err(e) => return Err(e),
        };

        reply_embed(ctx, embed, true).await
    }
}

// Re-export all commands
pub use inner::*;
