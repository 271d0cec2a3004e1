//! Reminder business logic - the operations Discord commands call into.
//!
//! These functions tie the duration parser, store and scheduler together and are
//! framework-agnostic so they can be tested without a Discord connection.

use crate::{
    core::{duration::parse_duration, scheduler::Scheduler, store::ReminderStore},
    entities::Reminder,
    errors::{Error, Result},
};
use chrono::Utc;
use tracing::info;

/// Creates, persists and schedules a reminder.
///
/// The duration is parsed before anything is stored, so an invalid duration or
/// an empty message leaves the store untouched. The returned reminder carries
/// the absolute `expires_at` the caller can display.
pub async fn create_reminder(
    store: &ReminderStore,
    scheduler: &Scheduler,
    owner_id: u64,
    origin_location_id: u64,
    duration_text: &str,
    message: &str,
) -> Result<Reminder> {
    let message = message.trim();
    if message.is_empty() {
        return Err(Error::EmptyMessage);
    }

    let seconds = parse_duration(duration_text)?;
    let seconds = i64::try_from(seconds).map_err(|_| Error::InvalidDuration {
        input: duration_text.to_string(),
    })?;
    let expires_at = Utc::now().timestamp().saturating_add(seconds);

    let reminder = Reminder::new(
        owner_id,
        origin_location_id,
        expires_at,
        message.to_string(),
        duration_text.to_string(),
    );

    store.append(reminder.clone()).await?;
    scheduler.schedule(reminder.clone());

    info!(
        reminder = %reminder.id,
        owner = owner_id,
        expires_at,
        "Reminder created"
    );
    Ok(reminder)
}

/// Pending reminders for `owner_id`, soonest first.
pub async fn list_reminders_for(store: &ReminderStore, owner_id: u64) -> Vec<Reminder> {
    store.list_for_owner(owner_id).await
}

/// Removes `reminder` from the store and stops its timer.
///
/// Returns `true` if the reminder was still pending. The timer is only stopped
/// once the record is gone, so a failed save leaves the reminder fully pending.
pub async fn cancel_reminder(
    store: &ReminderStore,
    scheduler: &Scheduler,
    reminder: &Reminder,
) -> Result<bool> {
    let removed = store.remove_first_match(reminder).await?;
    if removed {
        scheduler.cancel(reminder.id);
        info!(reminder = %reminder.id, "Reminder cancelled");
    }
    Ok(removed)
}

/// Cancels the reminder at 1-based `index` in `owner_id`'s list.
///
/// # Errors
/// Returns [`Error::ReminderNotFound`] if no reminder sits at that position.
pub async fn cancel_reminder_at(
    store: &ReminderStore,
    scheduler: &Scheduler,
    owner_id: u64,
    index: usize,
) -> Result<Reminder> {
    let reminders = list_reminders_for(store, owner_id).await;
    let reminder = index
        .checked_sub(1)
        .and_then(|i| reminders.get(i))
        .cloned()
        .ok_or(Error::ReminderNotFound { index })?;

    if !cancel_reminder(store, scheduler, &reminder).await? {
        return Err(Error::ReminderNotFound { index });
    }
    Ok(reminder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{setup_test_scheduler, wait_until};
    use std::time::Duration;

    #[tokio::test]
    async fn test_create_reminder_end_to_end() -> Result<()> {
        let (_dir, store, scheduler, notifier) = setup_test_scheduler();

        let before = Utc::now().timestamp();
        let reminder = create_reminder(&store, &scheduler, 1, 10, "2s", "test").await?;
        let after = Utc::now().timestamp();

        assert!(reminder.expires_at >= before + 2 && reminder.expires_at <= after + 2);
        assert_eq!(reminder.message, "test");
        assert_eq!(reminder.duration_text, "2s");
        assert_eq!(store.load_all().await, vec![reminder.clone()]);

        tokio::time::sleep(Duration::from_millis(500)).await;
        assert!(notifier.delivered().is_empty());

        wait_until(|| notifier.delivered().len() == 1).await;
        assert!(Utc::now().timestamp() >= reminder.expires_at);
        assert_eq!(notifier.delivered(), vec![reminder]);

        tokio::time::timeout(Duration::from_secs(5), async {
            while !store.load_all().await.is_empty() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .expect("delivered reminder should leave the store");

        tokio::time::sleep(Duration::from_millis(200)).await;
        assert_eq!(notifier.delivered().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_create_reminder_rejects_bad_input() {
        let (_dir, store, scheduler, _notifier) = setup_test_scheduler();

        let result = create_reminder(&store, &scheduler, 1, 10, "soon", "test").await;
        assert!(matches!(result, Err(Error::InvalidDuration { .. })));

        let result = create_reminder(&store, &scheduler, 1, 10, "5m", "   ").await;
        assert!(matches!(result, Err(Error::EmptyMessage)));

        assert!(store.load_all().await.is_empty());
        assert_eq!(scheduler.pending(), 0);
    }

    #[tokio::test]
    async fn test_list_and_cancel() -> Result<()> {
        let (_dir, store, scheduler, notifier) = setup_test_scheduler();

        let later = create_reminder(&store, &scheduler, 1, 10, "2h", "later").await?;
        let sooner = create_reminder(&store, &scheduler, 1, 10, "1h", "sooner").await?;
        create_reminder(&store, &scheduler, 2, 10, "1h", "someone else").await?;

        let mine = list_reminders_for(&store, 1).await;
        assert_eq!(mine, vec![sooner.clone(), later.clone()]);

        let cancelled = cancel_reminder_at(&store, &scheduler, 1, 2).await?;
        assert_eq!(cancelled, later);
        assert_eq!(list_reminders_for(&store, 1).await, vec![sooner.clone()]);
        assert_eq!(scheduler.pending(), 2);

        assert!(cancel_reminder(&store, &scheduler, &sooner).await?);
        assert!(!cancel_reminder(&store, &scheduler, &sooner).await?);
        assert!(list_reminders_for(&store, 1).await.is_empty());
        assert_eq!(scheduler.pending(), 1);
        assert!(notifier.delivered().is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_failed_cancel_keeps_timer_and_record() -> Result<()> {
        let (_dir, store, scheduler, _notifier) = setup_test_scheduler();
        let reminder = create_reminder(&store, &scheduler, 1, 10, "1h", "keep me").await?;

        // A directory where the temp file should go makes the save fail
        tokio::fs::create_dir(store.path().with_file_name("reminders.json.tmp")).await?;

        let result = cancel_reminder(&store, &scheduler, &reminder).await;
        assert!(matches!(result, Err(Error::Io(_))));
        assert_eq!(scheduler.pending(), 1);
        assert_eq!(store.load_all().await, vec![reminder]);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_record_without_id() -> Result<()> {
        let (_dir, store, scheduler, _notifier) = setup_test_scheduler();
        let document = format!(
            r#"[{{"owner_id": 1, "origin_location_id": 10, "expires_at": {}, "message": "legacy", "duration_text": "1h"}}]"#,
            Utc::now().timestamp() + 3_600
        );
        tokio::fs::write(store.path(), document).await?;
        assert_eq!(scheduler.restore().await, 1);

        let cancelled = cancel_reminder_at(&store, &scheduler, 1, 1).await?;
        assert_eq!(cancelled.message, "legacy");
        assert!(store.load_all().await.is_empty());
        assert_eq!(scheduler.pending(), 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_cancel_at_out_of_range() -> Result<()> {
        let (_dir, store, scheduler, _notifier) = setup_test_scheduler();
        create_reminder(&store, &scheduler, 1, 10, "1h", "only one").await?;

        for index in [0, 2] {
            let result = cancel_reminder_at(&store, &scheduler, 1, index).await;
            assert!(matches!(result, Err(Error::ReminderNotFound { index: i }) if i == index));
        }
        Ok(())
    }
}
