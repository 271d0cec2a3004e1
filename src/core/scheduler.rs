//! In-memory scheduling of reminder deliveries.
//!
//! Each pending reminder gets its own tokio task that sleeps until the reminder is
//! due, delivers it once, then removes it from the store. Durability lives entirely
//! in the [`ReminderStore`]; after a restart [`Scheduler::restore`] rebuilds the
//! timers from it.

use crate::{
    core::{notifier::Notifier, store::ReminderStore},
    entities::Reminder,
};
use chrono::Utc;
use dashmap::DashMap;
use std::{
    collections::HashMap,
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// A single waiting delivery. Identical stored records share an id, so one id
/// can own several timers.
#[derive(Debug)]
struct Timer {
    key: u64,
    token: CancellationToken,
}

/// Schedules reminder deliveries. Cloning shares the same timers.
#[derive(Clone)]
pub struct Scheduler {
    store: Arc<ReminderStore>,
    notifier: Arc<dyn Notifier>,
    timers: Arc<DashMap<Uuid, Vec<Timer>>>,
    next_key: Arc<AtomicU64>,
}

impl Scheduler {
    /// Creates a scheduler with no timers running.
    #[must_use]
    pub fn new(store: Arc<ReminderStore>, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            store,
            notifier,
            timers: Arc::new(DashMap::new()),
            next_key: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Starts a timer for `reminder` and returns immediately.
    ///
    /// Overdue reminders are delivered right away. Every call starts its own
    /// timer, one per stored copy of the reminder.
    pub fn schedule(&self, reminder: Reminder) {
        let key = self.next_key.fetch_add(1, Ordering::Relaxed);
        let token = CancellationToken::new();
        self.timers.entry(reminder.id).or_default().push(Timer {
            key,
            token: token.clone(),
        });

        let delay = delay_until(reminder.expires_at, Utc::now().timestamp());
        debug!(reminder = %reminder.id, delay_secs = delay.as_secs(), "Scheduling reminder");

        let scheduler = self.clone();
        tokio::spawn(async move { scheduler.run(reminder, delay, key, token).await });
    }

    /// Stops one waiting timer for `id` so it never delivers.
    ///
    /// Returns `false` when no timer is waiting, either because none was scheduled
    /// or because delivery has already started.
    pub fn cancel(&self, id: Uuid) -> bool {
        let timer = {
            let Some(mut timers) = self.timers.get_mut(&id) else {
                return false;
            };
            timers.pop()
        };
        self.timers.remove_if(&id, |_, timers| timers.is_empty());

        timer.map(|timer| timer.token.cancel()).is_some()
    }

    /// Schedules every persisted reminder. Returns how many timers were started.
    ///
    /// Copies that already have a running timer are skipped, so calling this
    /// again never delivers a reminder twice.
    pub async fn restore(&self) -> usize {
        let reminders = self.store.load_all().await;

        // id -> (timers running before restore, stored copies seen so far)
        let mut copies: HashMap<Uuid, (usize, usize)> = HashMap::new();
        let mut scheduled = 0;
        for reminder in reminders {
            let (running, seen) = copies.entry(reminder.id).or_insert_with(|| {
                let running = self.timers.get(&reminder.id).map_or(0, |t| t.len());
                (running, 0)
            });
            *seen += 1;
            if *seen > *running {
                self.schedule(reminder);
                scheduled += 1;
            }
        }
        info!("Restored {scheduled} pending reminders");
        scheduled
    }

    /// Number of timers still waiting to fire.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.timers.iter().map(|entry| entry.value().len()).sum()
    }

    /// Drops the timer `key` of reminder `id`. Returns `false` if `cancel` already took it.
    fn release(&self, id: Uuid, key: u64) -> bool {
        let released = {
            let Some(mut timers) = self.timers.get_mut(&id) else {
                return false;
            };
            let position = timers.iter().position(|t| t.key == key);
            position.map(|index| timers.swap_remove(index)).is_some()
        };
        self.timers.remove_if(&id, |_, timers| timers.is_empty());
        released
    }

    async fn run(self, reminder: Reminder, delay: Duration, key: u64, token: CancellationToken) {
        tokio::select! {
            () = token.cancelled() => {
                debug!(reminder = %reminder.id, "Reminder cancelled before firing");
                return;
            }
            () = tokio::time::sleep(delay) => {}
        }

        if !self.release(reminder.id, key) || token.is_cancelled() {
            return;
        }

        let result = self.notifier.deliver(&reminder).await;
        if result.ok() {
            info!(
                reminder = %reminder.id,
                fallback = result.fallback_used(),
                "Reminder delivered"
            );
        } else {
            warn!(reminder = %reminder.id, "Reminder dropped after failed delivery: {result:?}");
        }

        match self.store.remove_first_match(&reminder).await {
            Ok(true) => debug!(reminder = %reminder.id, "Removed delivered reminder"),
            Ok(false) => debug!(reminder = %reminder.id, "Delivered reminder was already removed"),
            Err(e) => error!(reminder = %reminder.id, "Failed to remove delivered reminder: {e}"),
        }
    }
}

/// Time left until `expires_at`, zero when already past.
fn delay_until(expires_at: i64, now: i64) -> Duration {
    Duration::from_secs(u64::try_from(expires_at.saturating_sub(now)).unwrap_or(0))
}
