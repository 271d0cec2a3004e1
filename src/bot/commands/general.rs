//! General Discord commands - ping and help.
//! This module contains simple commands that don't touch the reminder store.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" and the number of reminders waiting to fire.
    #[poise::command(slash_command, prefix_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let pending = ctx.data().scheduler.pending();
        ctx.say(format!("Pong! {pending} reminder(s) scheduled."))
            .await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command, prefix_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let prefix = &ctx.data().config.prefix;
        let help_text = format!(
            "**Reminder Help**\n\
            Here is a summary of all available commands.\n\n\
            **Reminders**\n\
            • `{prefix}remind <duration> <message>` or `/remind` - Sets a reminder, e.g. `{prefix}remind 1d2h30m stand up`.\n\
            • `/reminders list` - Shows your pending reminders.\n\
            • `/reminders cancel <number>` - Cancels one of them.\n\n\
            **Utility Commands**\n\
            • `/ping` - Checks if the bot is responsive.\n\
            • `/help` - Shows this help message.\n\n\
            Reminder commands need the Mute Members permission or the reminder role."
        );

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
