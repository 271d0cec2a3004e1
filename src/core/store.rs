//! Durable reminder storage backed by a single JSON document.
//!
//! The whole set of pending reminders is read and rewritten as one document.
//! Every read-modify-write sequence runs under the store's own mutex so two
//! concurrent callers can never each load a stale snapshot and clobber the
//! other's update.

use crate::{entities::Reminder, errors::Result};
use std::{
    io::ErrorKind,
    path::{Path, PathBuf},
};
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Persistent set of pending reminders.
#[derive(Debug)]
pub struct ReminderStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl ReminderStore {
    /// Creates a store backed by the document at `path`. The file does not need to exist yet.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing document.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads every persisted reminder.
    ///
    /// A missing document is an empty set. An unreadable or corrupt document is
    /// also treated as empty and logged as a warning; this never fails.
    ///
    /// Records written without an `id` are given one, and the document is saved
    /// back right away so every later load sees the same ids.
    pub async fn load_all(&self) -> Vec<Reminder> {
        let _guard = self.lock.lock().await;
        self.load_locked().await
    }

    /// Same as [`Self::load_all`] for callers already holding the store lock.
    async fn load_locked(&self) -> Vec<Reminder> {
        let Some(mut records) = self.read_records().await else {
            return Vec::new();
        };

        let assigned = assign_missing_ids(&mut records);
        let reminders: Vec<Reminder> = match serde_json::from_value(Value::Array(records)) {
            Ok(reminders) => reminders,
            Err(e) => {
                warn!("Failed to parse reminders from {:?}: {}", self.path, e);
                return Vec::new();
            }
        };

        if assigned > 0 {
            match self.save_all(&reminders).await {
                Ok(()) => info!("Assigned ids to {} stored reminders", assigned),
                Err(e) => warn!("Failed to persist assigned reminder ids: {}", e),
            }
        }
        reminders
    }

    async fn read_records(&self) -> Option<Vec<Value>> {
        let contents = match tokio::fs::read_to_string(&self.path).await {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Failed to read reminders from {:?}: {}", self.path, e);
                return None;
            }
        };

        if contents.trim().is_empty() {
            return None;
        }

        serde_json::from_str(&contents)
            .inspect_err(|e| warn!("Failed to parse reminders from {:?}: {}", self.path, e))
            .ok()
    }

    /// Replaces the backing document with `reminders`.
    ///
    /// The document is written to a sibling temp file and renamed into place, so
    /// a reader sees either the old document or the new one, never a partial write.
    pub async fn save_all(&self, reminders: &[Reminder]) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }

        let contents = serde_json::to_string_pretty(reminders)?;
        let tmp_path = self.tmp_path();
        tokio::fs::write(&tmp_path, contents).await?;
        tokio::fs::rename(&tmp_path, &self.path).await?;

        debug!("Saved {} reminders to {:?}", reminders.len(), self.path);
        Ok(())
    }

    /// Adds a reminder to the persisted set.
    pub async fn append(&self, reminder: Reminder) -> Result<()> {
        let _guard = self.lock.lock().await;
        let mut reminders = self.load_locked().await;
        reminders.push(reminder);
        self.save_all(&reminders).await
    }

    /// Removes the first reminder equal to `reminder`.
    ///
    /// Returns `false` without touching the document when nothing matches, which
    /// happens when a concurrent caller already removed it.
    pub async fn remove_first_match(&self, reminder: &Reminder) -> Result<bool> {
        let _guard = self.lock.lock().await;
        let mut reminders = self.load_locked().await;
        let Some(index) = reminders.iter().position(|r| r == reminder) else {
            return Ok(false);
        };
        reminders.remove(index);
        self.save_all(&reminders).await?;
        Ok(true)
    }

    /// Pending reminders created by `owner_id`, soonest first.
    pub async fn list_for_owner(&self, owner_id: u64) -> Vec<Reminder> {
        let _guard = self.lock.lock().await;
        let mut reminders: Vec<Reminder> = self
            .load_locked()
            .await
            .into_iter()
            .filter(|r| r.owner_id == owner_id)
            .collect();
        reminders.sort_by_key(|r| r.expires_at);
        reminders
    }

    fn tmp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_else(|| "reminders".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

/// Gives every object record lacking an `id` a fresh one. Returns how many were assigned.
fn assign_missing_ids(records: &mut [Value]) -> usize {
    let mut assigned = 0;
    for record in records.iter_mut().filter_map(Value::as_object_mut) {
        if !record.contains_key("id") {
            record.insert("id".to_string(), Value::String(Uuid::new_v4().to_string()));
            assigned += 1;
        }
    }
    assigned
}
