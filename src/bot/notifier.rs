//! Serenity-backed reminder transport.
//!
//! Sends reminder messages over Discord's HTTP API. Closed DMs are reported as
//! [`SendError::Refused`] so the delivery policy can fall back to the origin channel.

use crate::core::notifier::{SendError, Transport};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::sync::Arc;

/// Discord JSON error code for "Cannot send messages to this user".
const CANNOT_MESSAGE_USER: isize = 50007;

/// Delivers reminder text through the Discord HTTP client.
pub struct DiscordTransport {
    http: Arc<serenity::Http>,
}

impl DiscordTransport {
    /// Creates a transport sending through `http`.
    #[must_use]
    pub const fn new(http: Arc<serenity::Http>) -> Self {
        Self { http }
    }
}

#[async_trait]
impl Transport for DiscordTransport {
    async fn send_direct(&self, user_id: u64, text: &str) -> Result<(), SendError> {
        if user_id == 0 {
            return Err(SendError::Unresolvable("user id 0".to_string()));
        }

        let dm_channel = serenity::UserId::new(user_id)
            .create_dm_channel(&self.http)
            .await
            .map_err(classify)?;
        dm_channel.say(&self.http, text).await.map_err(classify)?;
        Ok(())
    }

    async fn send_to_location(&self, location_id: u64, text: &str) -> Result<(), SendError> {
        if location_id == 0 {
            return Err(SendError::Unresolvable("channel id 0".to_string()));
        }

        serenity::ChannelId::new(location_id)
            .say(&self.http, text)
            .await
            .map_err(classify)?;
        Ok(())
    }
}

fn classify(error: serenity::Error) -> SendError {
    if let serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) = &error {
        if response.error.code == CANNOT_MESSAGE_USER || response.status_code.as_u16() == 403 {
            return SendError::Refused;
        }
    }
    SendError::Unresolvable(error.to_string())
}
