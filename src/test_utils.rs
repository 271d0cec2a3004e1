//! Shared test utilities for the reminder bot.
//!
//! This module provides helpers for building stores on temporary directories,
//! sample reminders with sensible defaults, and in-memory stand-ins for the
//! Discord side of delivery.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use crate::{
    core::{
        notifier::{DeliveryResult, Notifier, SendError, Transport},
        scheduler::Scheduler,
        store::ReminderStore,
    },
    entities::Reminder,
};
use async_trait::async_trait;
use std::{
    sync::{Arc, Mutex},
    time::Duration,
};
use tempfile::TempDir;

/// Creates a store whose document lives in a fresh temporary directory.
/// Keep the returned `TempDir` alive for as long as the store is used.
pub fn setup_test_store() -> (TempDir, ReminderStore) {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    let store = ReminderStore::new(dir.path().join("reminders.json"));
    (dir, store)
}

/// Sets up a store, a recording notifier and a scheduler wired to both.
pub fn setup_test_scheduler() -> (TempDir, Arc<ReminderStore>, Scheduler, RecordingNotifier) {
    let (dir, store) = setup_test_store();
    let store = Arc::new(store);
    let notifier = RecordingNotifier::default();
    let scheduler = Scheduler::new(Arc::clone(&store), Arc::new(notifier.clone()));
    (dir, store, scheduler, notifier)
}

/// Creates a reminder with sensible defaults.
///
/// # Defaults
/// * `origin_location_id`: 10
/// * `duration_text`: `"1h"`
pub fn sample_reminder(owner_id: u64, expires_at: i64, message: &str) -> Reminder {
    Reminder::new(
        owner_id,
        10,
        expires_at,
        message.to_string(),
        "1h".to_string(),
    )
}

/// Polls `condition` until it holds, panicking after five seconds.
pub async fn wait_until(condition: impl Fn() -> bool) {
    tokio::time::timeout(Duration::from_secs(5), async {
        while !condition() {
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("condition not met within 5 seconds");
}

/// Notifier that records every reminder it is asked to deliver.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    delivered: Arc<Mutex<Vec<Reminder>>>,
}

impl RecordingNotifier {
    pub fn delivered(&self) -> Vec<Reminder> {
        self.delivered.lock().unwrap().clone()
    }
}

#[async_trait]
impl Notifier for RecordingNotifier {
    async fn deliver(&self, reminder: &Reminder) -> DeliveryResult {
        self.delivered.lock().unwrap().push(reminder.clone());
        DeliveryResult::Delivered
    }
}

/// Transport that stores sent messages in memory and can be told to fail.
#[derive(Clone, Default)]
pub struct FakeTransport {
    direct: Arc<Mutex<Vec<(u64, String)>>>,
    channel: Arc<Mutex<Vec<(u64, String)>>>,
    direct_error: Option<SendError>,
    channel_error: Option<SendError>,
}

impl FakeTransport {
    /// Makes every direct message fail with `error`.
    pub fn with_direct_error(mut self, error: SendError) -> Self {
        self.direct_error = Some(error);
        self
    }

    /// Makes every channel post fail with `error`.
    pub fn with_channel_error(mut self, error: SendError) -> Self {
        self.channel_error = Some(error);
        self
    }

    /// Successfully sent direct messages as `(user_id, text)`.
    pub fn direct_messages(&self) -> Vec<(u64, String)> {
        self.direct.lock().unwrap().clone()
    }

    /// Successfully posted channel messages as `(channel_id, text)`.
    pub fn channel_messages(&self) -> Vec<(u64, String)> {
        self.channel.lock().unwrap().clone()
    }
}

#[async_trait]
impl Transport for FakeTransport {
    async fn send_direct(&self, user_id: u64, text: &str) -> Result<(), SendError> {
        if let Some(error) = &self.direct_error {
            return Err(error.clone());
        }
        self.direct.lock().unwrap().push((user_id, text.to_string()));
        Ok(())
    }

    async fn send_to_location(&self, location_id: u64, text: &str) -> Result<(), SendError> {
        if let Some(error) = &self.channel_error {
            return Err(error.clone());
        }
        self.channel
            .lock()
            .unwrap()
            .push((location_id, text.to_string()));
        Ok(())
    }
}
