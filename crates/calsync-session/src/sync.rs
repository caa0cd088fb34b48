//! Writing a reminder diff to the store.
//!
//! Phases run in a fixed order: deletes, then creates, then updates. Each
//! phase is attempted whatever happened to the previous one, and nothing is
//! rolled back or retried. Updates of distinct reminders are sent
//! concurrently.

use std::fmt;

use calsync_core::{EventId, ReminderDiff};
use calsync_stores::{NewReminder, ReminderStore, StoreErrorCode};
use futures_util::future::join_all;
use serde::Serialize;
use tracing::{error, info, warn};

/// One of the three write phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncPhase {
    Delete,
    Create,
    Update,
}

impl fmt::Display for SyncPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Delete => "delete",
            Self::Create => "create",
            Self::Update => "update",
        })
    }
}

/// What happened in one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PhaseOutcome {
    pub phase: SyncPhase,
    /// Operations the phase tried.
    pub attempted: usize,
    /// Operations the store confirmed.
    pub succeeded: usize,
    /// Store messages for the failures.
    pub errors: Vec<String>,
}

impl PhaseOutcome {
    fn new(phase: SyncPhase, attempted: usize) -> Self {
        Self {
            phase,
            attempted,
            succeeded: 0,
            errors: Vec::new(),
        }
    }

    /// Returns how many operations failed.
    pub fn failed(&self) -> usize {
        self.attempted.saturating_sub(self.succeeded)
    }

    /// Returns true when every attempted operation succeeded.
    pub fn is_complete(&self) -> bool {
        self.succeeded >= self.attempted && self.errors.is_empty()
    }
}

/// Overall result of a sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncStatus {
    /// The diff was empty.
    NothingToDo,
    Complete,
    /// Some operations failed, others went through.
    Partial,
    /// Nothing went through.
    Failed,
}

/// Per-phase results of a sync.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    pub deletes: PhaseOutcome,
    pub creates: PhaseOutcome,
    pub updates: PhaseOutcome,
}

impl SyncReport {
    /// Returns the phases in the order they ran.
    pub fn phases(&self) -> [&PhaseOutcome; 3] {
        [&self.deletes, &self.creates, &self.updates]
    }

    /// Returns the overall status across the phases.
    pub fn status(&self) -> SyncStatus {
        let attempted: usize = self.phases().iter().map(|phase| phase.attempted).sum();
        let succeeded: usize = self.phases().iter().map(|phase| phase.succeeded).sum();
        if attempted == 0 {
            SyncStatus::NothingToDo
        } else if self.phases().iter().all(|phase| phase.is_complete()) {
            SyncStatus::Complete
        } else if succeeded == 0 {
            SyncStatus::Failed
        } else {
            SyncStatus::Partial
        }
    }

    /// Notification text for the user.
    pub fn user_message(&self) -> &'static str {
        match self.status() {
            SyncStatus::NothingToDo => "No changes to save",
            SyncStatus::Complete => "Reminders saved",
            SyncStatus::Partial => "Reminders synced partially, please retry",
            SyncStatus::Failed => "Failed to save reminders",
        }
    }
}

/// Writes `diff` for the reminders of `event_id`.
pub async fn apply_diff<S: ReminderStore + ?Sized>(
    store: &S,
    event_id: EventId,
    diff: &ReminderDiff,
) -> SyncReport {
    let report = SyncReport {
        deletes: delete_phase(store, diff).await,
        creates: create_phase(store, event_id, diff).await,
        updates: update_phase(store, diff).await,
    };
    info!(
        event_id,
        status = ?report.status(),
        deleted = report.deletes.succeeded,
        created = report.creates.succeeded,
        updated = report.updates.succeeded,
        "reminder sync finished"
    );
    report
}

async fn delete_phase<S: ReminderStore + ?Sized>(store: &S, diff: &ReminderDiff) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::new(SyncPhase::Delete, diff.deletes.len());
    if diff.deletes.is_empty() {
        return outcome;
    }

    match store.delete_bulk(diff.deletes.clone()).await {
        Ok(result) => {
            // Already gone counts as deleted.
            if !result.not_found_ids.is_empty() {
                warn!(ids = ?result.not_found_ids, "reminders already deleted");
            }
            outcome.succeeded = (result.deleted_count + result.not_found_ids.len()).min(outcome.attempted);
        }
        Err(err) if err.code() == StoreErrorCode::NotFound => {
            warn!(ids = ?diff.deletes, "reminders already deleted");
            outcome.succeeded = outcome.attempted;
        }
        Err(err) => {
            error!(error = %err, "reminder delete failed");
            outcome.errors.push(err.to_string());
        }
    }
    outcome
}

async fn create_phase<S: ReminderStore + ?Sized>(
    store: &S,
    event_id: EventId,
    diff: &ReminderDiff,
) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::new(SyncPhase::Create, diff.creates.len());
    if diff.creates.is_empty() {
        return outcome;
    }

    let reminders = diff
        .creates
        .iter()
        .map(|payload| NewReminder::new(event_id, *payload))
        .collect();
    match store.create_bulk(reminders).await {
        Ok(result) => {
            outcome.succeeded = result.created_count.min(outcome.attempted);
            if !result.errors.is_empty() {
                warn!(errors = ?result.errors, "some reminders were not created");
            }
            outcome.errors = result.errors;
        }
        Err(err) => {
            error!(error = %err, "reminder create failed");
            outcome.errors.push(err.to_string());
        }
    }
    outcome
}

async fn update_phase<S: ReminderStore + ?Sized>(store: &S, diff: &ReminderDiff) -> PhaseOutcome {
    let mut outcome = PhaseOutcome::new(SyncPhase::Update, diff.updates.len());

    let results = join_all(
        diff.updates
            .iter()
            .map(|update| async move { (update.id, store.update_reminder(update.id, update.payload).await) }),
    )
    .await;

    for (id, result) in results {
        match result {
            Ok(()) => outcome.succeeded += 1,
            Err(err) => {
                error!(id, error = %err, "reminder update failed");
                outcome.errors.push(format!("Reminder {}: {}", id, err.message()));
            }
        }
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use calsync_core::{NotificationType, PersistedReminder, ReminderPayload, ReminderUpdate, Trigger};
    use calsync_stores::{MemoryStore, StoreOperation, StoredEvent};
    use chrono::{TimeZone, Utc};

    fn relative(minutes: u32) -> ReminderPayload {
        ReminderPayload::new(Trigger::relative(minutes), NotificationType::Email)
    }

    fn store() -> MemoryStore {
        let start = Utc.with_ymd_and_hms(2025, 10, 10, 14, 0, 0).unwrap();
        MemoryStore::new()
            .with_event(StoredEvent {
                id: 10,
                title: "review".to_string(),
                description: None,
                start_datetime: start,
                end_datetime: None,
                is_all_day: false,
                color: None,
                categories: Vec::new(),
            })
            .with_reminder(PersistedReminder::relative(1, 10, 30))
            .with_reminder(PersistedReminder::relative(2, 10, 60))
            .with_reminder(PersistedReminder::relative(3, 10, 10))
    }

    fn diff() -> ReminderDiff {
        ReminderDiff {
            creates: vec![relative(5)],
            updates: vec![
                ReminderUpdate {
                    id: 1,
                    payload: relative(15),
                },
                ReminderUpdate {
                    id: 2,
                    payload: relative(45),
                },
            ],
            deletes: vec![3],
        }
    }

    #[tokio::test]
    async fn empty_diff_makes_no_calls() {
        let store = store();
        let report = apply_diff(&store, 10, &ReminderDiff::default()).await;
        assert_eq!(report.status(), SyncStatus::NothingToDo);
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn phases_run_in_order() {
        let store = store();
        let report = apply_diff(&store, 10, &diff()).await;

        assert_eq!(report.status(), SyncStatus::Complete);
        assert_eq!(report.user_message(), "Reminders saved");
        assert_eq!(
            store.calls(),
            vec![
                StoreOperation::DeleteReminders,
                StoreOperation::CreateReminders,
                StoreOperation::UpdateReminder,
                StoreOperation::UpdateReminder,
            ]
        );
        let minutes: Vec<_> = store
            .reminders_for(10)
            .iter()
            .map(|reminder| reminder.minutes_before)
            .collect();
        assert_eq!(minutes, vec![Some(15), Some(45), Some(5)]);
    }

    #[tokio::test]
    async fn failed_phase_does_not_block_others() {
        let store = store();
        store.fail(StoreOperation::CreateReminders);
        store.fail_reminder_update(2);

        let report = apply_diff(&store, 10, &diff()).await;

        assert_eq!(report.status(), SyncStatus::Partial);
        assert_eq!(report.user_message(), "Reminders synced partially, please retry");
        assert!(report.deletes.is_complete());
        assert_eq!(report.creates.failed(), 1);
        assert_eq!(report.updates.succeeded, 1);
        assert_eq!(report.updates.errors, vec!["Reminder 2: update of reminder 2 failed"]);
        insta::assert_json_snapshot!(report.phases().map(|phase| (phase.phase, phase.attempted, phase.succeeded)), @r#"
        [
          [
            "delete",
            1,
            1
          ],
          [
            "create",
            1,
            0
          ],
          [
            "update",
            2,
            1
          ]
        ]
        "#);
    }

    #[tokio::test]
    async fn everything_failing() {
        let store = store();
        for operation in [
            StoreOperation::DeleteReminders,
            StoreOperation::CreateReminders,
            StoreOperation::UpdateReminder,
        ] {
            store.fail(operation);
        }
        let report = apply_diff(&store, 10, &diff()).await;
        assert_eq!(report.status(), SyncStatus::Failed);
        assert_eq!(report.updates.errors.len(), 2);
    }

    #[tokio::test]
    async fn partial_bulk_create_is_counted() {
        let store = store();
        let report = apply_diff(
            &store,
            99,
            &ReminderDiff {
                creates: vec![relative(5)],
                ..Default::default()
            },
        )
        .await;
        assert_eq!(report.creates.succeeded, 0);
        assert_eq!(report.creates.errors, vec!["Reminder 1: Invalid or unauthorized event"]);
        assert_eq!(report.status(), SyncStatus::Failed);
    }

    #[tokio::test]
    async fn deleting_missing_reminders_is_not_a_failure() {
        let store = store();
        let report = apply_diff(
            &store,
            10,
            &ReminderDiff {
                deletes: vec![42],
                ..Default::default()
            },
        )
        .await;
        assert_eq!(report.status(), SyncStatus::Complete);
    }
}
