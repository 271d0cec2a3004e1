//! Reminder delivery.
//!
//! The scheduler only knows the [`Notifier`] trait. [`FallbackNotifier`] holds the
//! delivery policy (DM the owner, fall back to the channel the reminder was created
//! in) on top of a [`Transport`], which is the thin chat-platform boundary.

use crate::entities::Reminder;
use async_trait::async_trait;
use tracing::{debug, info, warn};

/// Outcome of a single delivery attempt.
///
/// Attempts are made exactly once and never retried, whatever the outcome.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeliveryResult {
    /// The owner received the reminder directly
    Delivered,
    /// Direct delivery failed and the reminder was posted in its origin channel
    DeliveredToFallback,
    /// Neither the owner nor the origin channel could be reached
    Unresolvable {
        /// Why the last attempt failed
        reason: String,
    },
}

impl DeliveryResult {
    /// Whether the text reached the owner, directly or through the fallback.
    #[must_use]
    pub const fn ok(&self) -> bool {
        !matches!(self, Self::Unresolvable { .. })
    }

    /// Whether the DM failed and the origin channel was used instead.
    #[must_use]
    pub const fn fallback_used(&self) -> bool {
        matches!(self, Self::DeliveredToFallback)
    }
}

/// Delivers due reminders.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Attempts delivery once. Failures are reported in the result, never panicked on.
    async fn deliver(&self, reminder: &Reminder) -> DeliveryResult;
}

/// Why a transport could not send a message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SendError {
    /// The recipient blocks messages from the bot (closed DMs)
    Refused,
    /// The target does not exist or the request failed
    Unresolvable(String),
}

/// Raw message sending on the chat platform.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `text` as a direct message to a user.
    async fn send_direct(&self, user_id: u64, text: &str) -> Result<(), SendError>;

    /// Posts `text` in a channel.
    async fn send_to_location(&self, location_id: u64, text: &str) -> Result<(), SendError>;
}

/// Renders the message a user receives when a reminder fires.
#[must_use]
pub fn reminder_text(reminder: &Reminder) -> String {
    format!(
        "## ⏰ Reminder!\n- **Reason:** {} `[after {}]`",
        reminder.message, reminder.duration_text
    )
}

/// DMs the owner, falling back to the origin channel with a mention.
#[derive(Debug)]
pub struct FallbackNotifier<T> {
    transport: T,
}

impl<T: Transport> FallbackNotifier<T> {
    /// Wraps `transport` with the DM-then-channel policy.
    #[must_use]
    pub const fn new(transport: T) -> Self {
        Self { transport }
    }
}

#[async_trait]
impl<T: Transport> Notifier for FallbackNotifier<T> {
    async fn deliver(&self, reminder: &Reminder) -> DeliveryResult {
        let text = reminder_text(reminder);

        match self.transport.send_direct(reminder.owner_id, &text).await {
            Ok(()) => {
                debug!(reminder = %reminder.id, "Reminder delivered by DM");
                return DeliveryResult::Delivered;
            }
            Err(SendError::Refused) => {
                info!(reminder = %reminder.id, "DM refused, falling back to origin channel");
            }
            Err(SendError::Unresolvable(reason)) => {
                info!(reminder = %reminder.id, "Owner unreachable ({reason}), falling back to origin channel");
            }
        }

        let fallback_text = format!("<@{}>\n{text}", reminder.owner_id);
        match self
            .transport
            .send_to_location(reminder.origin_location_id, &fallback_text)
            .await
        {
            Ok(()) => DeliveryResult::DeliveredToFallback,
            Err(e) => {
                let reason = match e {
                    SendError::Refused => "origin channel refused the message".to_string(),
                    SendError::Unresolvable(reason) => reason,
                };
                warn!(reminder = %reminder.id, "Reminder could not be delivered: {reason}");
                DeliveryResult::Unresolvable { reason }
            }
        }
    }
}
