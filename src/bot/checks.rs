//! Command checks shared by the reminder commands.

use crate::{bot::BotData, errors::Error};
use poise::serenity_prelude as serenity;

/// Allows members with the Mute Members permission or the configured reminder role.
///
/// Always denies outside of guilds.
pub async fn can_remind(ctx: poise::Context<'_, BotData, Error>) -> Result<bool, Error> {
    let Some(member) = ctx.author_member().await else {
        return Ok(false);
    };

    if let Some(role_id) = ctx.data().config.reminder_role_id.filter(|id| *id != 0) {
        if member.roles.contains(&serenity::RoleId::new(role_id)) {
            return Ok(true);
        }
    }

    // Interactions carry resolved permissions; prefix commands need the cached guild
    if let Some(permissions) = member.permissions {
        return Ok(permissions.mute_members());
    }

    Ok(ctx
        .guild()
        .is_some_and(|guild| guild.member_permissions(&member).mute_members()))
}
