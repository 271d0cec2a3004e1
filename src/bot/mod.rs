//! Bot layer - Discord-specific interface and command handlers
//!
//! This module wires the reminder core into a poise framework: slash and prefix
//! commands, the permission check, the serenity delivery transport and the
//! startup hook that restores persisted reminders.

/// Command checks (reminder permission)
pub mod checks;
/// Discord command implementations (reminder, general)
pub mod commands;
/// Serenity implementation of the reminder transport
pub mod notifier;

use crate::{
    config::AppConfig,
    core::{notifier::FallbackNotifier, scheduler::Scheduler, store::ReminderStore},
    errors::{Error, Result},
};
use notifier::DiscordTransport;
use poise::serenity_prelude as serenity;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Shared data available to all bot commands.
pub struct BotData {
    /// Settings loaded at startup
    pub config: Arc<AppConfig>,
    /// Persistent set of pending reminders
    pub store: Arc<ReminderStore>,
    /// Delivery timers for every pending reminder
    pub scheduler: Scheduler,
}

impl BotData {
    /// Creates a new `BotData` instance from its parts.
    #[must_use]
    pub const fn new(
        config: Arc<AppConfig>,
        store: Arc<ReminderStore>,
        scheduler: Scheduler,
    ) -> Self {
        Self {
            config,
            store,
            scheduler,
        }
    }
}

async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            error!("Error in command `{}`: {:?}", ctx.command().name, error);
            if let Err(e) = ctx.say(format!("An error occurred: {error}")).await {
                error!("Failed to send error message: {}", e);
            }
        }
        poise::FrameworkError::CommandCheckFailed { error, ctx, .. } => {
            if let Some(error) = error {
                error!("Check failed in command `{}`: {:?}", ctx.command().name, error);
            }
            let embed = serenity::CreateEmbed::default()
                .description(format!(
                    "**DENIED!** <@{}>, You're not allowed to use this command!",
                    ctx.author().id
                ))
                .color(ctx.data().config.embed_color);
            let reply = poise::CreateReply::default().embed(embed).ephemeral(true);
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send denial message: {}", e);
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Builds the poise framework and runs the Discord client until it stops.
///
/// Persisted reminders are rescheduled once the bot has logged in, because
/// delivery needs the client's HTTP handle.
#[instrument(skip(token, config))]
pub async fn run_bot(token: String, config: Arc<AppConfig>) -> Result<()> {
    let store = Arc::new(ReminderStore::new(config.reminders_file.clone()));
    info!("Reminder store at {:?}", store.path());

    let prefix = config.prefix.clone();
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: vec![
                crate::bot::commands::remind(),
                crate::bot::commands::reminders(),
                crate::bot::commands::ping(),
                crate::bot::commands::help(),
            ],
            prefix_options: poise::PrefixFrameworkOptions {
                prefix: Some(prefix),
                ..Default::default()
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                info!("Registering commands globally...");
                poise::builtins::register_globally(ctx, &framework.options().commands).await?;

                let transport = DiscordTransport::new(Arc::clone(&ctx.http));
                let scheduler =
                    Scheduler::new(Arc::clone(&store), Arc::new(FallbackNotifier::new(transport)));
                scheduler.restore().await;

                Ok(BotData::new(config, store, scheduler))
            })
        })
        .build();

    // Message content is needed for prefix commands
    let intents =
        serenity::GatewayIntents::non_privileged() | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;
    Ok(())
}
