//! Reminder entity - a pending request to message a user at a given time.
//!
//! A reminder lives in the store for exactly as long as it has not been delivered.
//! There is no update operation: once created, only removal changes the store.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A persisted reminder.
///
/// Equality covers every field, including `id`. Store removal relies on this.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reminder {
    /// Unique identifier, generated at creation
    pub id: Uuid,
    /// Discord user ID of the creator
    pub owner_id: u64,
    /// Discord channel ID the reminder was created in, used when a DM cannot be delivered
    pub origin_location_id: u64,
    /// Due time in seconds since the Unix epoch
    pub expires_at: i64,
    /// Text delivered to the owner
    pub message: String,
    /// Duration exactly as the user typed it, kept for display only
    pub duration_text: String,
}

impl Reminder {
    /// Creates a reminder with a freshly generated id.
    #[must_use]
    pub fn new(
        owner_id: u64,
        origin_location_id: u64,
        expires_at: i64,
        message: String,
        duration_text: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id,
            origin_location_id,
            expires_at,
            message,
            duration_text,
        }
    }

    /// Seconds left until the reminder is due. Negative once overdue.
    #[must_use]
    pub const fn remaining(&self, now: i64) -> i64 {
        self.expires_at.saturating_sub(now)
    }

    /// Whether the reminder is due at `now`.
    #[must_use]
    pub const fn is_due(&self, now: i64) -> bool {
        self.expires_at <= now
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_new_generates_distinct_ids() {
        let a = Reminder::new(1, 2, 100, "water".to_string(), "1m".to_string());
        let b = Reminder::new(1, 2, 100, "water".to_string(), "1m".to_string());
        assert_ne!(a.id, b.id);
        assert_ne!(a, b);
        assert_eq!(a, a.clone());
    }

    #[test]
    fn test_remaining_and_due() {
        let reminder = Reminder::new(1, 2, 1_000, "stretch".to_string(), "10s".to_string());
        assert_eq!(reminder.remaining(990), 10);
        assert!(!reminder.is_due(990));
        assert_eq!(reminder.remaining(1_005), -5);
        assert!(reminder.is_due(1_000));
    }

    #[test]
    fn test_deserialize_requires_id() {
        // Stores assign ids to legacy records before they reach this type
        let json = r#"{
            "owner_id": 42,
            "origin_location_id": 7,
            "expires_at": 1700000000,
            "message": "standup",
            "duration_text": "15m"
        }"#;
        assert!(serde_json::from_str::<Reminder>(json).is_err());
    }

    #[test]
    fn test_deserialize_stored_record() {
        let json = r#"{
            "id": "67e55044-10b1-426f-9247-bb680e5fe0c8",
            "owner_id": 42,
            "origin_location_id": 7,
            "expires_at": 1700000000,
            "message": "standup",
            "duration_text": "15m"
        }"#;

        let reminder: Reminder = serde_json::from_str(json).unwrap();
        assert_eq!(
            reminder.id,
            Uuid::parse_str("67e55044-10b1-426f-9247-bb680e5fe0c8").unwrap()
        );
        assert_eq!(reminder.owner_id, 42);
        assert_eq!(reminder.origin_location_id, 7);
        assert_eq!(reminder.expires_at, 1_700_000_000);
        assert_eq!(reminder.message, "standup");
        assert_eq!(reminder.duration_text, "15m");
    }
}
